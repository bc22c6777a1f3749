//! Application configuration management
//!
//! Handles config loading, validation, and environment variable processing
//! following the precedence: defaults -> .env -> env vars -> CLI args.

use crate::api::ProviderSettings;
use crate::networking::{CacheMode, NetworkingConfig};
use crate::primitives::*;
use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Default configuration values
pub mod defaults {
    pub const DATABASE_FILE: &str = "modlist.csv";
    pub const DOWNLOAD_FOLDER: &str = "downloads";
    pub const API_RESPONSE_FOLDER: &str = "api-responses";
    pub const LOG_LEVEL: &str = "1"; // Warnings carry data integrity notices
    pub const LOG_FORMAT: &str = "text";
    pub const NET_TIMEOUT: &str = "30";
    pub const MAX_RETRIES: &str = "3";
    pub const LOG_OUTPUT: &str = "stderr";
    pub const TTY_CAPS_DETECT_INTENT: &str = "auto";
}

/// Default value functions for configuration fields
mod default_fns {
    use super::*;

    pub fn database_file() -> PathBuf {
        PathBuf::from(defaults::DATABASE_FILE)
    }

    pub fn download_folder() -> PathBuf {
        PathBuf::from(defaults::DOWNLOAD_FOLDER)
    }

    pub fn log_level() -> u8 {
        1
    }

    pub fn log_format() -> LogFormat {
        LogFormat::Text
    }

    pub fn net_timeout() -> u64 {
        30
    }

    pub fn max_retries() -> u32 {
        3
    }

    pub fn log_output() -> LogOutput {
        LogOutput::Stderr
    }

    pub fn tty_caps_detect_intent() -> TerminalCapsDetectIntent {
        TerminalCapsDetectIntent::Auto
    }
}

/// Application configuration structure
#[derive(Debug, Clone, Parser, Deserialize)]
pub struct AppConfig {
    /// CSV mod database to operate on
    #[arg(long, global = true, env = "MODLIST_DATABASE_FILE", default_value = defaults::DATABASE_FILE)]
    #[serde(default = "default_fns::database_file")]
    pub database_file: PathBuf,

    /// Serve recorded API responses, asking providers only on a miss
    #[arg(long, global = true, env = "MODLIST_USE_CACHED_RESPONSES")]
    #[serde(default)]
    pub use_cached_responses: bool,

    /// Never contact providers; a missing recorded response is an error
    #[arg(long, global = true, env = "MODLIST_CACHED_ONLY")]
    #[serde(default)]
    pub cached_only: bool,

    /// Folder holding recorded API responses
    #[arg(long, global = true, env = "MODLIST_API_RESPONSE_FOLDER")]
    #[serde(default)]
    pub api_response_folder: Option<PathBuf>,

    /// Root folder for downloaded artifacts and server runs
    #[arg(long, global = true, env = "MODLIST_DOWNLOAD_FOLDER", default_value = defaults::DOWNLOAD_FOLDER)]
    #[serde(default = "default_fns::download_folder")]
    pub download_folder: PathBuf,

    /// API timeout in seconds
    #[arg(long, global = true, env = "MODLIST_NET_TIMEOUT", default_value = defaults::NET_TIMEOUT)]
    #[serde(default = "default_fns::net_timeout")]
    pub net_timeout: u64,

    /// Retries for transient provider failures
    #[arg(long, global = true, env = "MODLIST_MAX_RETRIES", default_value = defaults::MAX_RETRIES)]
    #[serde(default = "default_fns::max_retries")]
    pub max_retries: u32,

    /// CurseForge API key (falls back to CURSEFORGE_API_KEY)
    #[arg(long, global = true, env = "MODLIST_CURSEFORGE_API_KEY", hide_env_values = true)]
    #[serde(default)]
    pub curseforge_api_key: Option<String>,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, global = true, env = "MODLIST_GITHUB_TOKEN", hide_env_values = true)]
    #[serde(default)]
    pub github_token: Option<String>,

    #[arg(long, global = true, env = "MODLIST_MODRINTH_API_BASE_URL", hide = true)]
    #[serde(default)]
    pub modrinth_api_base_url: Option<String>,

    #[arg(long, global = true, env = "MODLIST_CURSEFORGE_API_BASE_URL", hide = true)]
    #[serde(default)]
    pub curseforge_api_base_url: Option<String>,

    #[arg(long, global = true, env = "MODLIST_GITHUB_API_BASE_URL", hide = true)]
    #[serde(default)]
    pub github_api_base_url: Option<String>,

    #[arg(long, global = true, env = "MODLIST_MOJANG_API_BASE_URL", hide = true)]
    #[serde(default)]
    pub mojang_api_base_url: Option<String>,

    #[arg(long, global = true, env = "MODLIST_FABRIC_API_BASE_URL", hide = true)]
    #[serde(default)]
    pub fabric_api_base_url: Option<String>,

    /// Verbosity level (0=error, 1=warn, 2=info, 3=debug, 4=trace)
    #[arg(long, global = true, env = "MODLIST_LOG_LEVEL", default_value = defaults::LOG_LEVEL)]
    #[serde(default = "default_fns::log_level")]
    pub log_level: u8,

    /// Log format (text, json, pretty)
    #[arg(long, global = true, env = "MODLIST_LOG_FORMAT", default_value = defaults::LOG_FORMAT)]
    #[serde(default = "default_fns::log_format")]
    pub log_format: LogFormat,

    /// Log output stream (stderr, stdout)
    #[arg(long, global = true, env = "MODLIST_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT)]
    #[serde(default = "default_fns::log_output")]
    pub log_output: LogOutput,

    /// Color output control (auto, always, never)
    #[arg(long, global = true, env = "MODLIST_COLOR", default_value = defaults::TTY_CAPS_DETECT_INTENT)]
    #[serde(default = "default_fns::tty_caps_detect_intent")]
    pub color: TerminalCapsDetectIntent,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_file: default_fns::database_file(),
            use_cached_responses: false,
            cached_only: false,
            api_response_folder: None,
            download_folder: default_fns::download_folder(),
            net_timeout: default_fns::net_timeout(),
            max_retries: default_fns::max_retries(),
            curseforge_api_key: None,
            github_token: None,
            modrinth_api_base_url: None,
            curseforge_api_base_url: None,
            github_api_base_url: None,
            mojang_api_base_url: None,
            fabric_api_base_url: None,
            log_level: default_fns::log_level(),
            log_format: default_fns::log_format(),
            log_output: default_fns::log_output(),
            color: default_fns::tty_caps_detect_intent(),
        }
    }
}

impl AppConfig {
    /// Create LoggerConfig from AppConfig and TerminalCapabilities
    pub fn to_logger_config(&self, terminal_caps: &crate::terminal::TerminalCapabilities) -> LoggerConfig {
        LoggerConfig {
            level: LogLevel::from_verbosity(self.log_level),
            format: self.log_format,
            output: self.log_output,
            terminal_caps: terminal_caps.clone(),
        }
    }

    pub fn cache_mode(&self) -> CacheMode {
        CacheMode::from_flags(self.use_cached_responses, self.cached_only)
    }

    /// Networking setup derived from the CLI flags
    pub fn networking_config(&self) -> NetworkingConfig {
        NetworkingConfig {
            timeout_seconds: self.net_timeout,
            max_retries: self.max_retries,
            cache_dir: self
                .api_response_folder
                .clone()
                .unwrap_or_else(default_api_response_folder),
            cache_mode: self.cache_mode(),
            ..NetworkingConfig::default()
        }
    }

    /// Base URL overrides and credentials for the provider clients
    pub fn provider_settings(&self) -> ProviderSettings {
        let overrides = [
            (ProviderKind::Modrinth, &self.modrinth_api_base_url),
            (ProviderKind::CurseForge, &self.curseforge_api_base_url),
            (ProviderKind::GitHub, &self.github_api_base_url),
            (ProviderKind::Mojang, &self.mojang_api_base_url),
            (ProviderKind::Fabric, &self.fabric_api_base_url),
        ];
        let base_urls: HashMap<_, _> = overrides
            .into_iter()
            .filter_map(|(kind, url)| url.clone().map(|url| (kind, url)))
            .collect();

        ProviderSettings {
            base_urls,
            curseforge_api_key: self.curseforge_api_key.clone().filter(|key| !key.trim().is_empty()),
            github_token: self.github_token.clone().filter(|token| !token.trim().is_empty()),
        }
    }

    /// Merge this config with another, taking non-default values from other
    pub fn merge_with(mut self, other: Self) -> Self {
        // For Option fields, take other if it's Some
        macro_rules! take_some {
            ($($field:ident),+) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })+
            };
        }
        take_some!(
            api_response_folder,
            curseforge_api_key,
            github_token,
            modrinth_api_base_url,
            curseforge_api_base_url,
            github_api_base_url,
            mojang_api_base_url,
            fabric_api_base_url
        );

        // Switches only ever turn on
        self.use_cached_responses |= other.use_cached_responses;
        self.cached_only |= other.cached_only;

        // For primitive fields, take other if it's not the default
        if other.database_file != default_fns::database_file() {
            self.database_file = other.database_file;
        }
        if other.download_folder != default_fns::download_folder() {
            self.download_folder = other.download_folder;
        }
        if other.log_level != default_fns::log_level() {
            self.log_level = other.log_level;
        }
        if other.net_timeout != default_fns::net_timeout() {
            self.net_timeout = other.net_timeout;
        }
        if other.max_retries != default_fns::max_retries() {
            self.max_retries = other.max_retries;
        }

        // For enums, detect if it's non-default
        if !matches!(other.log_format, LogFormat::Text) {
            self.log_format = other.log_format;
        }
        if !matches!(other.log_output, LogOutput::Stderr) {
            self.log_output = other.log_output;
        }
        if !matches!(other.color, TerminalCapsDetectIntent::Auto) {
            self.color = other.color;
        }

        self
    }

    /// Validate the final configuration
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.net_timeout == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "--net-timeout must be at least 1 second".to_string(),
            });
        }
        if self.database_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "--database-file must not be empty".to_string(),
            });
        }

        if self.api_response_folder.is_none() {
            self.api_response_folder = Some(default_api_response_folder());
        }

        Ok(())
    }
}

/// Per-user cache folder, or `./api-responses` when there is no home
fn default_api_response_folder() -> PathBuf {
    directories::ProjectDirs::from("", "", "modlist")
        .map(|dirs| dirs.cache_dir().join(defaults::API_RESPONSE_FOLDER))
        .unwrap_or_else(|| PathBuf::from(defaults::API_RESPONSE_FOLDER))
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}
