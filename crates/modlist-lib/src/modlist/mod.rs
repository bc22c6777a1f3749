//! Mod database and the operations on it

pub mod add;
pub mod database;
pub mod download;
pub mod reconcile;
pub mod record;
pub mod server;
pub mod versions;

pub use add::{AddError, AddRequest, add_record, parse_project_url};
pub use database::{Database, DatabaseError, RecordUpdate, merge_row};
pub use download::{DownloadError, DownloadOptions, DownloadOutcome, DownloadSummary, Downloader};
pub use reconcile::{
    ReconcileError, ReconcileMode, ReconcileOptions, ReconcileReport, Reconciler, RowOutcome, RowReport,
    Targets, UpdateSummary,
};
pub use record::{Dependencies, DependencyRef, ModRecord, VersionSlot};
pub use server::{ServerError, ServerHandle, ServerLauncher, TailOutcome, tail_for_pattern};
pub use versions::{compare_versions, latest_game_version, majority_game_version, next_game_version};
