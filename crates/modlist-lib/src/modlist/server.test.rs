use super::*;
use tempfile::TempDir;

fn shell(dir: &Path, script: &str) -> ServerLauncher {
    ServerLauncher::new(dir, "sh", vec!["-c".to_string(), script.to_string()])
}

#[test]
fn test_java_command_line() {
    let launcher = ServerLauncher::java("/srv/1.21.5", "fabric-server.jar", &["-Xmx2G".to_string()]);
    assert_eq!(launcher.command_line(), "java -Xmx2G -jar fabric-server.jar nogui");
}

#[tokio::test]
async fn test_missing_jar_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let launcher = ServerLauncher::java(temp_dir.path(), "server.jar", &[]);
    assert!(matches!(launcher.start().await, Err(ServerError::JarNotFound { .. })));

    let missing = ServerLauncher::java(temp_dir.path().join("nope"), "server.jar", &[]);
    assert!(matches!(missing.start().await, Err(ServerError::FolderNotFound { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn test_success_line_then_clean_stop() {
    let temp_dir = TempDir::new().unwrap();
    let script = r#"echo "Loading"; echo 'Done (1.5s)! For help, type "help"'; read cmd; echo "got $cmd""#;
    let mut handle = shell(temp_dir.path(), script).start().await.unwrap();

    let outcome = tail_for_pattern(
        &mut handle,
        DEFAULT_SUCCESS_PATTERN,
        DEFAULT_FAILURE_PATTERN,
        Duration::from_secs(10),
    )
    .await;
    assert_eq!(outcome, TailOutcome::Matched);

    let status = handle.stop(Duration::from_secs(10)).await.unwrap();
    assert!(status.is_some_and(|s| s.success()));
}

#[cfg(unix)]
#[tokio::test]
async fn test_failure_line_is_returned() {
    let temp_dir = TempDir::new().unwrap();
    let script = "echo 'Exception in server tick loop' >&2; sleep 30";
    let mut handle = shell(temp_dir.path(), script).start().await.unwrap();

    let outcome = tail_for_pattern(&mut handle, "Done (", "Exception", Duration::from_secs(10)).await;
    assert_eq!(outcome, TailOutcome::Failed("Exception in server tick loop".to_string()));

    // sleep ignores stdin, so the grace period runs out
    let status = handle.stop(Duration::from_millis(200)).await.unwrap();
    assert!(status.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_exit_and_timeout() {
    let temp_dir = TempDir::new().unwrap();

    let mut exited = shell(temp_dir.path(), "echo starting").start().await.unwrap();
    let outcome = tail_for_pattern(&mut exited, "Done (", "", Duration::from_secs(10)).await;
    assert_eq!(outcome, TailOutcome::Exited);

    let mut silent = shell(temp_dir.path(), "sleep 30").start().await.unwrap();
    let outcome = tail_for_pattern(&mut silent, "Done (", "", Duration::from_millis(200)).await;
    assert_eq!(outcome, TailOutcome::TimedOut);
    silent.stop(Duration::from_millis(100)).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_eula_written_only_when_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let eula = temp_dir.path().join("eula.txt");

    let handle = shell(temp_dir.path(), "true").start().await.unwrap();
    handle.stop(Duration::from_secs(5)).await.unwrap();
    assert!(!eula.exists());

    let handle = shell(temp_dir.path(), "true").accept_eula(true).start().await.unwrap();
    handle.stop(Duration::from_secs(5)).await.unwrap();
    assert_eq!(std::fs::read_to_string(eula).unwrap(), "eula=true\n");
}
