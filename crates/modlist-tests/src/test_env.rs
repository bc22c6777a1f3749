//! Hermetic test environment for E2E testing
//!
//! Every test gets its own temporary directory holding the database, the
//! response cache and the download tree. Sessions use the live provider
//! clients pointed at a mock HTTP server.

use anyhow::Result;
use modlist_lib::application::config::AppConfig;
use modlist_lib::application::session::CommandSession;
use modlist_lib::modlist::Database;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated filesystem layout for one test
pub struct TestEnvironment {
    /// Removed when the environment is dropped
    pub temp_dir: TempDir,
    pub database_path: PathBuf,
    pub cache_path: PathBuf,
    pub download_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();

        let cache_path = root.join("responses");
        let download_path = root.join("downloads");
        fs::create_dir_all(&cache_path)?;

        Ok(Self {
            database_path: root.join("modlist.csv"),
            cache_path,
            download_path,
            temp_dir,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write the database file verbatim
    pub fn write_database(&self, contents: &str) -> Result<()> {
        fs::write(&self.database_path, contents)?;
        Ok(())
    }

    pub fn read_database(&self) -> Result<Database> {
        Ok(Database::load(&self.database_path)?)
    }

    pub fn database_text(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.database_path)?)
    }

    /// Configuration with every provider pointed at `server_url`
    pub fn config(&self, server_url: &str) -> AppConfig {
        AppConfig {
            database_file: self.database_path.clone(),
            api_response_folder: Some(self.cache_path.clone()),
            download_folder: self.download_path.clone(),
            net_timeout: 5,
            max_retries: 0,
            modrinth_api_base_url: Some(server_url.to_string()),
            curseforge_api_base_url: Some(server_url.to_string()),
            github_api_base_url: Some(server_url.to_string()),
            mojang_api_base_url: Some(server_url.to_string()),
            fabric_api_base_url: Some(server_url.to_string()),
            ..AppConfig::default()
        }
    }

    /// Session with live clients against `server_url`
    pub fn session(&self, server_url: &str) -> Result<CommandSession> {
        CommandSession::new(self.config(server_url))
    }

    /// Session built from a customized configuration
    pub fn session_with(&self, config: AppConfig) -> Result<CommandSession> {
        CommandSession::new(config)
    }
}
