//! Configuration loading and global state management
//!
//! Coordinates loading configuration from various sources and provides
//! global application configuration access.

use crate::primitives::ConfigError;
use std::sync::OnceLock;

use super::{cli::CliConfig, config::AppConfig, env::EnvironmentConfig};

// Global configuration available throughout the application
static GLOBAL_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Environment files read at startup, first hit wins per variable
const ENV_FILES: [&str; 2] = [".env.local", ".env"];

impl CliConfig {
    /// Load config: defaults -> .env -> env vars -> CLI
    pub fn load_layered() -> Result<Self, ConfigError> {
        load_env_files()?;
        let environment = EnvironmentConfig::load()?;
        let cli = CliConfig::load()?;

        Ok(Self {
            app_config: AppConfig::layered(&environment, cli.app_config)?,
            command: cli.command,
        })
    }
}

impl AppConfig {
    /// Combine the layers of an already parsed command line
    ///
    /// Clap has applied `MODLIST_*` variables and defaults to `cli`; the
    /// standard environment fills what is still unset.
    pub fn layered(environment: &EnvironmentConfig, cli: AppConfig) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.color = environment.apply_color_config(config.color);
        environment.apply_provider_config(&mut config);

        let mut config = config.merge_with(cli);
        config.validate()?;
        Ok(config)
    }

    /// Initialize global configuration (call once in main)
    pub fn init_global(config: AppConfig) -> Result<(), ConfigError> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| ConfigError::AlreadyInitialized)
    }

    /// Global configuration, if `init_global` has run
    pub fn global() -> Option<&'static AppConfig> {
        GLOBAL_CONFIG.get()
    }
}

/// Load `.env.local` and `.env` into the process environment
///
/// Missing files are fine; unreadable or malformed ones are not.
fn load_env_files() -> Result<(), ConfigError> {
    for env_file in ENV_FILES {
        match dotenvy::from_filename(env_file) {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(ConfigError::EnvFileError {
                    file: env_file.to_string(),
                    source: e,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
