use crate::primitives::{ConfigError, Loader, ModGroup, ModType, ProviderKind, SlotKind};
use clap::{Args, Parser, Subcommand};

use super::config::AppConfig;

/// modlist CLI - Minecraft mod database manager
#[derive(Debug, Clone, Parser)]
#[command(name = "modlist")]
#[command(about = "Keep a CSV database of Minecraft mods in sync with their providers")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration loaded from CLI
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
}

impl CliConfig {
    /// Load configuration from command line arguments
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Cli::parse().into())
    }

    /// Parse an explicit argument list (first item is the program name)
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Cli::try_parse_from(args)?.into())
    }
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            app_config: cli.config,
            command: cli.command,
        }
    }
}

/// Available modlist commands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Add a record from a project URL, an ID or a direct download link
    Add(AddArgs),

    /// Remove records by ID
    Remove {
        /// ID of the record to remove
        id: String,

        /// Only remove records of this type
        #[arg(long = "type", value_enum)]
        mod_type: Option<ModType>,

        /// Only remove records for this loader
        #[arg(long)]
        loader: Option<Loader>,
    },

    /// List the records of the database
    List {
        #[arg(long, value_enum)]
        group: Option<ModGroup>,

        #[arg(long = "type", value_enum)]
        mod_type: Option<ModType>,
    },

    /// Fill Next/Latest versions and missing data; Current stays pinned
    Validate(ReconcileArgs),

    /// Like validate, but also move Current to the newest release
    Update(ReconcileArgs),

    /// Validate, save, then download the selected artifacts
    Download {
        #[command(flatten)]
        reconcile: ReconcileArgs,

        #[command(flatten)]
        download: DownloadArgs,
    },

    /// Download the selected artifacts as recorded, without validating first
    DownloadMods(DownloadArgs),

    /// Start the server of a game version and wait for it to come up
    StartServer(ServerArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct AddArgs {
    /// Project URL, project ID, or direct download URL
    pub source: String,

    /// Provider of a bare project ID
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// ID to store instead of the one derived from the source
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long = "type", value_enum)]
    pub mod_type: Option<ModType>,

    #[arg(long, default_value = "fabric")]
    pub loader: Loader,

    #[arg(long, value_enum, default_value_t = ModGroup::Required)]
    pub group: ModGroup,

    /// Game version to resolve for (defaults to the database majority)
    #[arg(long)]
    pub game_version: Option<String>,

    /// Version to pin (required for direct downloads)
    #[arg(id = "mod_version", long = "mod-version")]
    pub version: Option<String>,

    /// Download URL of a direct record
    #[arg(long = "download-url")]
    pub download_url: Option<String>,

    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ReconcileArgs {
    /// Next game version to check (defaults to the one after the majority)
    #[arg(long)]
    pub next_game_version: Option<String>,

    /// Never report Latest past this game version
    #[arg(long)]
    pub latest_ceiling: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DownloadArgs {
    /// Version slot to download
    #[arg(long, value_enum, default_value_t = SlotKind::Current)]
    pub slot: SlotKind,

    /// Replace files that already exist
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServerArgs {
    /// Game version folder to run (defaults to the database majority)
    #[arg(long)]
    pub game_version: Option<String>,

    /// Jar to start (defaults to the launcher or server record's jar)
    #[arg(long)]
    pub jar: Option<String>,

    /// Extra JVM argument, may be repeated
    #[arg(long = "java-arg", allow_hyphen_values = true)]
    pub java_args: Vec<String>,

    /// Write eula.txt accepting the Minecraft EULA
    #[arg(long)]
    pub accept_eula: bool,

    /// Seconds to wait for the server to come up
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    #[arg(long, default_value = crate::modlist::server::DEFAULT_SUCCESS_PATTERN)]
    pub success_pattern: String,

    #[arg(long, default_value = crate::modlist::server::DEFAULT_FAILURE_PATTERN)]
    pub failure_pattern: String,
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
