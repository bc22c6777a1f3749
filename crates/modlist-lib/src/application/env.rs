//! Environment variable handling for application configuration
//!
//! Standard variables shared with other tools: color switches, CI
//! detection, provider credentials and API base URLs. `MODLIST_*`
//! variables and flags take precedence over these.

use crate::primitives::{ConfigError, TerminalCapsDetectIntent};
use serde::Deserialize;

use super::config::AppConfig;

/// Environment variables that affect application behavior
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfig {
    /// NO_COLOR environment variable (any value = disable color)
    pub no_color: Option<String>,
    /// FORCE_COLOR environment variable (0/false = disable, 1/2/3/true = enable)
    pub force_color: Option<String>,
    /// CLICOLOR environment variable (0 = disable color)
    pub clicolor: Option<String>,
    /// CI environment variable (any value = CI mode)
    pub ci: Option<String>,

    pub curseforge_api_key: Option<String>,
    pub github_token: Option<String>,
    pub modrinth_api_base_url: Option<String>,
    pub curseforge_api_base_url: Option<String>,
    pub github_api_base_url: Option<String>,
    pub mojang_api_base_url: Option<String>,
    pub fabric_api_base_url: Option<String>,
}

impl EnvironmentConfig {
    /// Load environment configuration from current environment
    pub fn load() -> Result<Self, ConfigError> {
        envy::from_env().map_err(|e| ConfigError::EnvironmentParsingFailed { source: e })
    }

    /// Apply environment variables to color configuration
    ///
    /// Precedence: CI > CLICOLOR < NO_COLOR < FORCE_COLOR
    pub fn apply_color_config(&self, mut color: TerminalCapsDetectIntent) -> TerminalCapsDetectIntent {
        if self.ci.is_some() {
            return TerminalCapsDetectIntent::Never;
        }

        if self.clicolor.as_deref() == Some("0") {
            color = TerminalCapsDetectIntent::Never;
        }

        if self.no_color.as_deref().is_some_and(|value| !value.is_empty()) {
            color = TerminalCapsDetectIntent::Never;
        }

        if let Some(force_color) = &self.force_color {
            match force_color.as_str() {
                "0" | "false" => color = TerminalCapsDetectIntent::Never,
                "1" | "2" | "3" | "true" => color = TerminalCapsDetectIntent::Always,
                _ => {} // Invalid values ignored
            }
        }

        color
    }

    /// Fill provider credentials and base URLs the config leaves unset
    pub fn apply_provider_config(&self, config: &mut AppConfig) {
        let pairs = [
            (&mut config.curseforge_api_key, &self.curseforge_api_key),
            (&mut config.github_token, &self.github_token),
            (&mut config.modrinth_api_base_url, &self.modrinth_api_base_url),
            (&mut config.curseforge_api_base_url, &self.curseforge_api_base_url),
            (&mut config.github_api_base_url, &self.github_api_base_url),
            (&mut config.mojang_api_base_url, &self.mojang_api_base_url),
            (&mut config.fabric_api_base_url, &self.fabric_api_base_url),
        ];

        for (target, value) in pairs {
            if target.is_none() {
                *target = value.clone().filter(|v| !v.trim().is_empty());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("env.test.rs");
}
