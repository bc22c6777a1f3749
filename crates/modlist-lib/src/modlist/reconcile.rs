//! Row reconciliation
//!
//! Each row is resolved against its provider for three targets: its own
//! game version (Current), the fleet's next game version (Next) and no
//! game version at all (Latest). The results are merged into the row and
//! every row gets an outcome; one failing row never stops the batch.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

use super::database::{Database, RecordUpdate, merge_row};
use super::record::{Dependencies, ModRecord, VersionSlot};
use super::versions::{compare_versions, majority_game_version, next_game_version, sort_versions};
use crate::api::{ProviderRegistry, ResolveError, ResolvedVersion, VersionQuery};
use crate::primitives::ConfigError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Configuration error: {source}")]
    Configuration {
        #[from]
        source: ConfigError,
    },
}

/// Whether a newer current version replaces the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Fill Next/Latest and missing data, keep Current pinned
    #[default]
    Validate,
    /// Also move Current to the newest release for its game version
    Update,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub mode: ReconcileMode,
    /// Next game version instead of the one after the majority
    pub next_game_version: Option<String>,
    /// Latest never goes past this game version
    pub latest_ceiling: Option<String>,
}

/// Fleet-wide targets, computed once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub majority: Option<String>,
    pub next: Option<String>,
    pub latest_ceiling: Option<String>,
}

impl Targets {
    pub fn compute(records: &[ModRecord], options: &ReconcileOptions) -> Self {
        let majority = majority_game_version(records);
        let next = options
            .next_game_version
            .clone()
            .filter(|gv| !gv.trim().is_empty())
            .or_else(|| majority.as_deref().and_then(next_game_version));

        Self {
            majority,
            next,
            latest_ceiling: options.latest_ceiling.clone(),
        }
    }
}

/// Final state of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Resolved,
    NotFound { reason: String },
    Errored { reason: String },
    /// Nothing to resolve (direct downloads)
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReport {
    pub label: String,
    pub outcome: RowOutcome,
    /// Stored row was edited outside the tool since the last write
    pub drifted: bool,
    /// Merge changed the row's content
    pub changed: bool,
    pub update_available: bool,
    /// `None` when there is no next target
    pub supports_next: Option<bool>,
}

impl RowReport {
    fn new(record: &ModRecord, outcome: RowOutcome) -> Self {
        Self {
            label: record.label(),
            outcome,
            drifted: record.has_drifted(),
            changed: false,
            update_available: false,
            supports_next: None,
        }
    }
}

/// Aggregate counters of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub total: usize,
    pub supporting_latest: usize,
    pub update_available: usize,
    pub not_supporting_latest: usize,
    pub unchanged: usize,
    pub externally_modified: usize,
    pub updated: usize,
    pub not_found: usize,
    pub errored: usize,
}

impl UpdateSummary {
    pub fn record(&mut self, report: &RowReport) {
        self.total += 1;

        match &report.outcome {
            RowOutcome::NotFound { .. } => {
                self.not_found += 1;
                return;
            }
            RowOutcome::Errored { .. } => {
                self.errored += 1;
                return;
            }
            RowOutcome::Skipped => {
                self.unchanged += 1;
                return;
            }
            RowOutcome::Resolved => {}
        }

        match report.supports_next {
            Some(true) => self.supporting_latest += 1,
            Some(false) => self.not_supporting_latest += 1,
            None => {}
        }
        if report.update_available {
            self.update_available += 1;
        }
        if report.changed {
            self.updated += 1;
        } else {
            self.unchanged += 1;
            if report.drifted {
                self.externally_modified += 1;
            }
        }
    }

    /// Label/count pairs in display order
    pub fn entries(&self) -> [(&'static str, usize); 9] {
        [
            ("Total", self.total),
            ("Supporting next version", self.supporting_latest),
            ("Not supporting next version", self.not_supporting_latest),
            ("Update available", self.update_available),
            ("Updated", self.updated),
            ("Unchanged", self.unchanged),
            ("Externally modified", self.externally_modified),
            ("Not found", self.not_found),
            ("Errored", self.errored),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub targets: Targets,
    pub rows: Vec<RowReport>,
    pub summary: UpdateSummary,
}

/// Resolves every row of a database against its provider
pub struct Reconciler<'a> {
    registry: &'a ProviderRegistry,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a ProviderRegistry, options: ReconcileOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    pub async fn reconcile(&self, database: &mut Database) -> Result<ReconcileReport, ReconcileError> {
        self.reconcile_with(database, |_| {}).await
    }

    /// Reconcile every row, calling `on_row` after each one
    pub async fn reconcile_with<F>(
        &self,
        database: &mut Database,
        mut on_row: F,
    ) -> Result<ReconcileReport, ReconcileError>
    where
        F: FnMut(&RowReport),
    {
        let providers: BTreeSet<_> = database
            .records()
            .iter()
            .map(|record| record.provider)
            .filter(|provider| provider.is_resolvable())
            .collect();
        self.registry.ensure_configured(providers)?;

        database.ensure_schema();
        let targets = Targets::compute(database.records(), &self.options);
        info!(
            "Reconciling {} records (majority {}, next {})",
            database.len(),
            targets.majority.as_deref().unwrap_or("-"),
            targets.next.as_deref().unwrap_or("-")
        );

        let mut report = ReconcileReport {
            targets: targets.clone(),
            ..ReconcileReport::default()
        };

        for record in database.records_mut() {
            let (merged, row) = self.reconcile_row(record, &targets).await;
            debug!("{}: {:?}", row.label, row);

            *record = merged;
            report.summary.record(&row);
            on_row(&row);
            report.rows.push(row);
        }

        Ok(report)
    }

    /// Reconcile one row; failed rows come back unchanged
    pub async fn reconcile_row(&self, record: &ModRecord, targets: &Targets) -> (ModRecord, RowReport) {
        if record.has_drifted() {
            debug!(
                "{} was modified outside modlist since it was last written",
                record.label()
            );
        }

        if !record.provider.is_resolvable() {
            return (record.clone(), RowReport::new(record, RowOutcome::Skipped));
        }

        match self.resolve_update(record, targets).await {
            Ok((update, update_available, supports_next)) => {
                let merged = merge_row(record, &update);
                let mut row = RowReport::new(record, RowOutcome::Resolved);
                row.changed = merged.compute_hash() != record.compute_hash();
                row.update_available = update_available;
                row.supports_next = supports_next;
                (merged, row)
            }
            Err(e) => {
                let outcome = if e.is_not_found() {
                    debug!("{}: {}", record.label(), e);
                    RowOutcome::NotFound {
                        reason: e.to_string(),
                    }
                } else {
                    debug!("{}: {}", record.label(), e);
                    RowOutcome::Errored {
                        reason: e.to_string(),
                    }
                };
                (record.clone(), RowReport::new(record, outcome))
            }
        }
    }

    async fn resolve_update(
        &self,
        record: &ModRecord,
        targets: &Targets,
    ) -> Result<(RecordUpdate, bool, Option<bool>), ResolveError> {
        let provider = self.registry.get(record.provider)?;
        let base = VersionQuery::for_record(record);

        let current_game_version = Some(record.current.game_version.trim())
            .filter(|gv| !gv.is_empty())
            .or(targets.majority.as_deref());

        // Current
        let newest = provider
            .resolve_version(&base.clone().with_game_version(current_game_version))
            .await?;
        let slot_game_version = |resolved: &ResolvedVersion| {
            current_game_version
                .map(str::to_string)
                .unwrap_or_else(|| resolved.game_version.clone())
        };

        let stored = record.current.version.trim();
        let update_available =
            stored.is_empty() || compare_versions(&newest.version, stored) == Ordering::Greater;

        let mut update = RecordUpdate::default();
        let mut available = newest.available_game_versions.clone();

        let replace_current = stored.is_empty()
            || same_version(&newest.version, stored)
            || (update_available && self.options.mode == ReconcileMode::Update);

        if replace_current {
            update.current = Some(VersionSlot::resolved(
                newest.version.clone(),
                newest.download_url.clone(),
                slot_game_version(&newest),
            ));
            update.jar = Some(newest.jar_filename.clone());
            update.current_dependencies = Some(Dependencies::from_refs(newest.dependencies.clone()));
        } else {
            // Keep the stored pin; refresh what belongs to it
            let pinned = base
                .clone()
                .with_game_version(current_game_version)
                .with_version(Some(stored));
            match provider.resolve_version(&pinned).await {
                Ok(resolved) => {
                    let mut slot = record.current.clone();
                    if slot.url.is_empty() {
                        slot.url = resolved.download_url.clone();
                    }
                    if slot.game_version.is_empty() {
                        slot.game_version = slot_game_version(&resolved);
                    }
                    update.current = Some(slot);
                    if record.jar.is_empty() {
                        update.jar = Some(resolved.jar_filename.clone());
                    }
                    update.current_dependencies =
                        Some(Dependencies::from_refs(resolved.dependencies));
                }
                Err(e) if e.is_not_found() => {
                    debug!("{}: stored version {} is no longer listed", record.label(), stored);
                }
                Err(e) => return Err(e),
            }
        }

        // Next
        let supports_next = match targets.next.as_deref() {
            Some(next) => {
                match provider
                    .resolve_version(&base.clone().with_game_version(Some(next)))
                    .await
                {
                    Ok(resolved) => {
                        available.extend(resolved.available_game_versions.iter().cloned());
                        update.next = Some(VersionSlot::resolved(
                            resolved.version,
                            resolved.download_url,
                            next,
                        ));
                        Some(true)
                    }
                    Err(e) if e.is_not_found() => {
                        update.next = Some(VersionSlot::default());
                        Some(false)
                    }
                    Err(e) => return Err(e),
                }
            }
            None => None,
        };

        // Latest
        let latest_query = base.with_ceiling(targets.latest_ceiling.as_deref());
        match provider.resolve_version(&latest_query).await {
            Ok(resolved) => {
                available.extend(resolved.available_game_versions.iter().cloned());
                update.latest_dependencies = Some(Dependencies::from_refs(resolved.dependencies));
                update.latest = Some(VersionSlot::resolved(
                    resolved.version,
                    resolved.download_url,
                    resolved.game_version,
                ));
            }
            Err(e) if e.is_not_found() => {
                update.latest = Some(VersionSlot::default());
                update.latest_dependencies = Some(Dependencies::default());
            }
            Err(e) => return Err(e),
        }

        update.available_game_versions = Some(sort_versions(available));
        Ok((update, update_available, supports_next))
    }
}

fn same_version(a: &str, b: &str) -> bool {
    let strip = |v: &str| v.trim().trim_start_matches(['v', 'V']).to_lowercase();
    strip(a) == strip(b)
}

#[cfg(test)]
mod tests {
    include!("reconcile.test.rs");
}
