//! Application layer modules
//!
//! CLI interface, layered configuration, command sessions and the
//! handlers that run each command.

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod loader;
pub mod session;

// Re-export main types for convenience
pub use cli::{Cli, CliConfig, Commands};
pub use commands::{execute_command, execute_command_with_session};
pub use config::AppConfig;
pub use session::CommandSession;
