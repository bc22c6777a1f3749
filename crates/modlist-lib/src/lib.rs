//! # modlist Library
//!
//! Keeps a CSV database of Minecraft mods, resource packs, shaders,
//! launchers and servers in sync with Modrinth, CurseForge, GitHub,
//! Mojang and Fabric.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types, errors, and shared coordination
//! - [`terminal`] - Terminal capability detection
//! - [`display`] - User-facing status output and progress bars
//! - [`logger`] - Structured logging with progress tracking
//! - [`networking`] - Async HTTP client with retries, rate limits and a response cache
//! - [`api`] - Provider clients that resolve versions and project metadata
//! - [`modlist`] - Records, the CSV database, reconciliation and downloads
//! - [`application`] - CLI interface and configuration management
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! modlist_lib::main().await
//! # }
//! ```

pub mod api;
pub mod application;
pub mod display;
pub mod logger;
pub mod modlist;
pub mod networking;
pub mod primitives;
pub mod terminal;

// Re-export commonly used types for convenience
pub use api::{ProviderRegistry, ResolvedVersion, VersionProvider, VersionQuery};
pub use application::{AppConfig, Cli, CliConfig, Commands, execute_command};
pub use display::Display;
pub use logger::Logger;
pub use modlist::{Database, ModRecord, Reconciler};
pub use networking::{NetworkingConfig, NetworkingManager};
pub use primitives::{
    ConfigError, LogFormat, LogLevel, LogOutput, LoggerError, ModGroup, ModType, ProviderKind,
    TerminalCapsDetectIntent, TerminalColorCaps,
};
pub use terminal::TerminalCapabilities;

use anyhow::{Context, Result};

pub async fn main() -> Result<()> {
    // Defaults -> .env files -> environment -> CLI
    let config = CliConfig::load_layered()?;

    let capabilities = TerminalCapabilities::detect_from_config(&config.app_config)
        .unwrap_or_else(|_| TerminalCapabilities::minimal());
    Display::init(capabilities.clone())?;
    Logger::init(config.app_config.to_logger_config(&capabilities))
        .context("Failed to initialize logging")?;
    AppConfig::init_global(config.app_config.clone())?;

    execute_command(config).await
}
