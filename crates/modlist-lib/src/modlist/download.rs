//! Artifact downloads
//!
//! Files land in `<root>/<gameVersion>/<folder>/<file>`; server, launcher
//! and installer jars go straight into `<root>/<gameVersion>/`. A failing
//! file is counted and logged, the rest of the batch carries on.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::record::ModRecord;
use crate::networking::{NetworkingError, NetworkingManager};
use crate::primitives::{ModGroup, SlotKind};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{label} has no download URL for the {slot} version")]
    MissingUrl { label: String, slot: SlotKind },

    #[error("{label} has no game version for the {slot} version")]
    MissingGameVersion { label: String, slot: SlotKind },

    #[error("{label}: '{value}' cannot be used as a {what}")]
    UnsafePath {
        label: String,
        what: &'static str,
        value: String,
    },

    #[error("Download of {url} failed: {source}")]
    Networking {
        url: String,
        #[source]
        source: NetworkingError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub root: PathBuf,
    pub slot: SlotKind,
    /// Download even when the destination already exists
    pub force: bool,
}

impl DownloadOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            slot: SlotKind::Current,
            force: false,
        }
    }
}

/// One file to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    pub label: String,
    pub url: String,
    pub destination: PathBuf,
}

impl DownloadItem {
    /// Where `record`'s artifact for `slot` goes below `root`
    pub fn for_record(record: &ModRecord, slot: SlotKind, root: &Path) -> Result<Self, DownloadError> {
        let version = record.slot(slot);
        let url = version.url.trim();
        if url.is_empty() {
            return Err(DownloadError::MissingUrl {
                label: record.label(),
                slot,
            });
        }

        let game_version = version.game_version.trim();
        if game_version.is_empty() {
            return Err(DownloadError::MissingGameVersion {
                label: record.label(),
                slot,
            });
        }

        let file_name = match slot {
            SlotKind::Current if !record.jar.trim().is_empty() => record.jar.trim().to_string(),
            _ => file_name_from_url(url),
        };

        for (what, value) in [("folder name", game_version), ("file name", file_name.as_str())] {
            if !is_plain_component(value) {
                return Err(DownloadError::UnsafePath {
                    label: record.label(),
                    what,
                    value: value.to_string(),
                });
            }
        }

        let mut destination = root.join(game_version);
        if let Some(folder) = record.mod_type.download_folder() {
            destination.push(folder);
        }
        destination.push(file_name);

        Ok(Self {
            label: record.label(),
            url: url.to_string(),
            destination,
        })
    }
}

/// Last path segment of a URL, percent-decoded
///
/// Separators that only appear after decoding are cut as well, so the
/// result never leaves the folder it is joined to.
pub fn file_name_from_url(url: &str) -> String {
    let segment = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .unwrap_or_default();
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let name = decoded.rsplit(['/', '\\']).next().unwrap_or_default();
    if is_plain_component(name) {
        name.to_string()
    } else {
        "download".to_string()
    }
}

/// A single normal path component: no separators, not `.` or `..`
pub(crate) fn is_plain_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded { bytes: u64 },
    /// Destination already present
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadSummary {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

/// Downloads the artifacts of a set of records
pub struct Downloader<'a> {
    networking: &'a NetworkingManager,
    options: DownloadOptions,
}

impl<'a> Downloader<'a> {
    pub fn new(networking: &'a NetworkingManager, options: DownloadOptions) -> Self {
        Self { networking, options }
    }

    /// Records that take part in a download (block rows never do)
    pub fn eligible<'r>(records: &'r [ModRecord]) -> impl Iterator<Item = &'r ModRecord> {
        records.iter().filter(|record| record.group != ModGroup::Block)
    }

    pub async fn download_all(&self, records: &[ModRecord]) -> DownloadSummary {
        self.download_all_with(records, |_, _| {}).await
    }

    /// Download every eligible record, calling `on_item` after each one
    pub async fn download_all_with<F>(&self, records: &[ModRecord], mut on_item: F) -> DownloadSummary
    where
        F: FnMut(&str, &DownloadOutcome),
    {
        let mut summary = DownloadSummary::default();

        for record in Self::eligible(records) {
            let outcome = match DownloadItem::for_record(record, self.options.slot, &self.options.root) {
                Ok(item) => self.download(&item).await,
                Err(e) => {
                    warn!("{}", e);
                    DownloadOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            summary.record(&outcome);
            on_item(&record.label(), &outcome);
        }

        summary
    }

    pub async fn download(&self, item: &DownloadItem) -> DownloadOutcome {
        if !self.options.force && item.destination.exists() {
            debug!("{} already present at {}", item.label, item.destination.display());
            return DownloadOutcome::Skipped;
        }

        match self.networking.download(&item.url, &item.destination, None).await {
            Ok(bytes) => DownloadOutcome::Downloaded { bytes },
            Err(source) => {
                let e = DownloadError::Networking {
                    url: item.url.clone(),
                    source,
                };
                warn!("{}: {}", item.label, e);
                DownloadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    include!("download.test.rs");
}
