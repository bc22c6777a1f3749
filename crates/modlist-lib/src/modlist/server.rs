//! Server smoke test
//!
//! Starts a server process in its game version folder, watches its output
//! for a success or failure line and shuts it down again.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Line a vanilla or Fabric server prints once it accepts players
pub const DEFAULT_SUCCESS_PATTERN: &str = "Done (";
/// Line printed when the server crashes during startup
pub const DEFAULT_FAILURE_PATTERN: &str = "Exception";
/// How long `stop` waits for a clean shutdown before killing
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Server folder not found: {path}")]
    FolderNotFound { path: String },

    #[error("Server jar not found: {path}")]
    JarNotFound { path: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// How a server process is started
#[derive(Debug, Clone)]
pub struct ServerLauncher {
    working_dir: PathBuf,
    program: String,
    args: Vec<String>,
    accept_eula: bool,
    required_file: Option<PathBuf>,
}

impl ServerLauncher {
    /// Arbitrary program run inside `working_dir`
    pub fn new(working_dir: impl Into<PathBuf>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            program: program.into(),
            args,
            accept_eula: false,
            required_file: None,
        }
    }

    /// `java <java_args> -jar <jar> nogui` inside `working_dir`
    pub fn java(working_dir: impl Into<PathBuf>, jar: &str, java_args: &[String]) -> Self {
        let mut args = java_args.to_vec();
        args.extend(["-jar".to_string(), jar.to_string(), "nogui".to_string()]);

        let mut launcher = Self::new(working_dir, "java", args);
        launcher.required_file = Some(PathBuf::from(jar));
        launcher
    }

    /// Write `eula=true` before starting
    pub fn accept_eula(mut self, accept: bool) -> Self {
        self.accept_eula = accept;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Program and arguments, for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub async fn start(&self) -> Result<ServerHandle, ServerError> {
        if !self.working_dir.is_dir() {
            return Err(ServerError::FolderNotFound {
                path: self.working_dir.display().to_string(),
            });
        }
        if let Some(file) = &self.required_file {
            let path = self.working_dir.join(file);
            if !path.is_file() {
                return Err(ServerError::JarNotFound {
                    path: path.display().to_string(),
                });
            }
        }
        if self.accept_eula {
            tokio::fs::write(self.working_dir.join("eula.txt"), "eula=true\n").await?;
            debug!("Accepted EULA in {}", self.working_dir.display());
        }

        info!("Starting `{}` in {}", self.command_line(), self.working_dir.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ServerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let (sender, lines) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, sender.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, sender);
        }
        let stdin = child.stdin.take();

        Ok(ServerHandle { child, stdin, lines })
    }
}

fn forward_lines<R>(stream: R, sender: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            trace!("server: {}", line);
            if sender.send(line).is_err() {
                break;
            }
        }
    });
}

/// A running server process
#[derive(Debug)]
pub struct ServerHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: mpsc::UnboundedReceiver<String>,
}

impl ServerHandle {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Send `stop`, wait up to `grace`, then kill
    pub async fn stop(mut self, grace: Duration) -> Result<Option<ExitStatus>, ServerError> {
        if let Some(mut stdin) = self.stdin.take() {
            // The process may already be gone
            if let Err(e) = stdin.write_all(b"stop\n").await {
                debug!("Could not send stop command: {}", e);
            }
            let _ = stdin.flush().await;
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => Ok(Some(status?)),
            Err(_) => {
                warn!("Server did not stop within {:?}, killing it", grace);
                self.child.kill().await?;
                Ok(None)
            }
        }
    }
}

/// What the watched output showed first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailOutcome {
    Matched,
    Failed(String),
    /// Output ended without either pattern
    Exited,
    TimedOut,
}

/// Read the server's output until `success` or `failure` shows up
///
/// An empty `failure` pattern never matches.
pub async fn tail_for_pattern(
    handle: &mut ServerHandle,
    success: &str,
    failure: &str,
    timeout: Duration,
) -> TailOutcome {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match tokio::time::timeout_at(deadline, handle.lines.recv()).await {
            Err(_) => return TailOutcome::TimedOut,
            Ok(None) => return TailOutcome::Exited,
            Ok(Some(line)) => {
                if line.contains(success) {
                    return TailOutcome::Matched;
                }
                if !failure.is_empty() && line.contains(failure) {
                    return TailOutcome::Failed(line);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("server.test.rs");
}
