//! Terminal capability detection
//!
//! Decides whether user-facing output may use color and unicode symbols.
//! Detection is environment based: TTY check, `TERM`/`COLORTERM`, and the
//! user's `--color` intent (already adjusted for `NO_COLOR`/`FORCE_COLOR`
//! by the application loader).

use crate::application::AppConfig;
use crate::primitives::{TerminalCapsDetectIntent, TerminalColorCaps};
use serde::Deserialize;
use std::io::{self, IsTerminal};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("Failed to parse terminal environment: {source}")]
    EnvironmentParsingFailed {
        #[from]
        source: envy::Error,
    },
}

/// Terminal-related environment variables
#[derive(Debug, Clone, Default, Deserialize)]
struct TerminalEnvConfig {
    term: Option<String>,
    colorterm: Option<String>,
    lang: Option<String>,
    lc_all: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalCapabilities {
    pub color: TerminalColorCaps,
    pub unicode: bool,
    pub is_tty: bool,
    pub cols: u16,
}

impl TerminalCapabilities {
    /// Detect capabilities for stdout, honouring the configured color intent
    pub fn detect_from_config(config: &AppConfig) -> Result<Self, TerminalError> {
        let env_config = envy::from_env::<TerminalEnvConfig>()?;
        let is_tty = io::stdout().is_terminal();

        let color = match config.color {
            TerminalCapsDetectIntent::Never => TerminalColorCaps::None,
            TerminalCapsDetectIntent::Always => {
                color_from_env(&env_config).max_with(TerminalColorCaps::Ansi16)
            }
            TerminalCapsDetectIntent::Auto if is_tty => color_from_env(&env_config),
            TerminalCapsDetectIntent::Auto => TerminalColorCaps::None,
        };

        let cols = if is_tty {
            console::Term::stdout().size().1
        } else {
            80
        };

        Ok(Self {
            color,
            unicode: unicode_from_env(&env_config),
            is_tty,
            cols,
        })
    }

    /// Plain capabilities for non-interactive output and tests
    pub fn minimal() -> Self {
        Self {
            color: TerminalColorCaps::None,
            unicode: false,
            is_tty: false,
            cols: 80,
        }
    }

    pub fn supports_color(&self) -> bool {
        self.color != TerminalColorCaps::None
    }
}

impl TerminalColorCaps {
    fn rank(&self) -> u8 {
        match self {
            TerminalColorCaps::None => 0,
            TerminalColorCaps::Ansi16 => 1,
            TerminalColorCaps::Ansi256 => 2,
            TerminalColorCaps::TrueColor => 3,
        }
    }

    fn max_with(self, other: TerminalColorCaps) -> TerminalColorCaps {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

fn color_from_env(env: &TerminalEnvConfig) -> TerminalColorCaps {
    if let Some(colorterm) = &env.colorterm {
        if matches!(colorterm.as_str(), "truecolor" | "24bit") {
            return TerminalColorCaps::TrueColor;
        }
    }

    match env.term.as_deref() {
        None | Some("dumb") => TerminalColorCaps::None,
        Some(term) if term.contains("256color") => TerminalColorCaps::Ansi256,
        Some(_) => TerminalColorCaps::Ansi16,
    }
}

fn unicode_from_env(env: &TerminalEnvConfig) -> bool {
    [&env.lc_all, &env.lang]
        .into_iter()
        .flatten()
        .any(|value| value.to_uppercase().contains("UTF-8") || value.to_uppercase().contains("UTF8"))
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
