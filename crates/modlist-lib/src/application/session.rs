//! Command session
//!
//! Each command execution creates a session that owns its ephemeral state:
//! the configuration, the shared networking manager and the provider
//! clients. Tests build sessions around mock providers instead.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::api::ProviderRegistry;
use crate::application::config::AppConfig;
use crate::modlist::Database;
use crate::networking::NetworkingManager;
use crate::primitives::ConfigError;

pub struct CommandSession {
    config: AppConfig,
    networking: Arc<NetworkingManager>,
    registry: ProviderRegistry,
}

impl CommandSession {
    /// Production composition: live clients for every provider
    pub fn new(config: AppConfig) -> Result<Self> {
        let networking = Arc::new(
            NetworkingManager::new(config.networking_config())
                .context("Failed to initialize networking")?,
        );
        let registry = ProviderRegistry::live(networking.clone(), &config.provider_settings());

        Ok(Self {
            config,
            networking,
            registry,
        })
    }

    /// Session with caller supplied provider clients
    pub fn with_registry(config: AppConfig, registry: ProviderRegistry) -> Result<Self> {
        let networking = Arc::new(
            NetworkingManager::new(config.networking_config())
                .context("Failed to initialize networking")?,
        );
        Ok(Self {
            config,
            networking,
            registry,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn networking(&self) -> &NetworkingManager {
        &self.networking
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn database_path(&self) -> &Path {
        &self.config.database_file
    }

    /// Load the configured database; a missing file is a configuration error
    pub fn load_database(&self) -> Result<Database> {
        let path = self.database_path();
        if !path.is_file() {
            return Err(ConfigError::DatabaseNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Database::load(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Load the database, or start an empty one when the file is missing
    pub fn load_or_create_database(&self) -> Result<Database> {
        let path = self.database_path();
        if path.exists() {
            return self.load_database();
        }

        let mut database = Database::new_empty();
        database.set_path(path.to_path_buf());
        Ok(database)
    }

    pub fn save_database(&self, database: &Database) -> Result<()> {
        database
            .save_to(self.database_path())
            .with_context(|| format!("Failed to write {}", self.database_path().display()))
    }
}
