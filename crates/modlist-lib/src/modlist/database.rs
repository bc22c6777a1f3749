//! CSV mod database
//!
//! The whole file is read once, edited in memory and written back once.
//! Writing goes through a temporary file in the target directory that is
//! renamed over the original, so readers never observe a truncated file.
//! Column order, header spelling, unknown columns, cells past the end of
//! the header and untouched rows survive a round trip.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::record::{Dependencies, ModRecord, RecordError, VersionSlot, columns};
use crate::primitives::{Loader, ModType};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database file not found: {path}")]
    NotFound { path: String },

    #[error("Database has no file path to save to")]
    NoPath,

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: RecordError,
    },

    #[error("Record '{id}' already exists for {mod_type}/{loader}")]
    DuplicateRecord {
        id: String,
        mod_type: ModType,
        loader: Loader,
    },

    #[error("No record matches '{id}'")]
    RecordNotFound { id: String },
}

/// Partial update of a record; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub current: Option<VersionSlot>,
    pub next: Option<VersionSlot>,
    pub latest: Option<VersionSlot>,
    pub jar: Option<String>,
    pub available_game_versions: Option<Vec<String>>,
    pub current_dependencies: Option<Dependencies>,
    pub latest_dependencies: Option<Dependencies>,
}

impl RecordUpdate {
    pub fn is_empty(&self) -> bool {
        *self == RecordUpdate::default()
    }
}

/// Apply an update to a copy of `existing` and recompute its hash
pub fn merge_row(existing: &ModRecord, update: &RecordUpdate) -> ModRecord {
    let mut merged = existing.clone();

    if let Some(slot) = &update.current {
        merged.current = slot.clone();
    }
    if let Some(slot) = &update.next {
        merged.next = slot.clone();
    }
    if let Some(slot) = &update.latest {
        merged.latest = slot.clone();
    }
    if let Some(jar) = &update.jar {
        merged.jar = jar.clone();
    }
    if let Some(versions) = &update.available_game_versions {
        merged.available_game_versions = versions.clone();
    }
    if let Some(deps) = &update.current_dependencies {
        merged.current_dependencies = deps.clone();
    }
    if let Some(deps) = &update.latest_dependencies {
        merged.latest_dependencies = deps.clone();
    }

    merged.refresh_hash();
    merged
}

/// The mod database: a header and its rows
#[derive(Debug, Clone)]
pub struct Database {
    path: Option<PathBuf>,
    /// Trimmed column names used for lookups
    headers: Vec<String>,
    /// Header cells as written in the file
    raw_headers: Vec<String>,
    records: Vec<ModRecord>,
}

impl Database {
    /// Empty database with the canonical header
    pub fn new_empty() -> Self {
        let headers: Vec<String> = columns::CANONICAL.iter().map(|c| c.to_string()).collect();
        Self {
            path: None,
            raw_headers: headers.clone(),
            headers,
            records: Vec::new(),
        }
    }

    /// Load a database file; a missing file is an error
    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        if !path.is_file() {
            return Err(DatabaseError::NotFound {
                path: path.display().to_string(),
            });
        }

        let file = std::fs::File::open(path)?;
        let mut database = Self::from_reader(file)?;
        database.path = Some(path.to_path_buf());

        debug!(
            "Loaded {} records ({} columns) from {}",
            database.records.len(),
            database.headers.len(),
            path.display()
        );
        Ok(database)
    }

    /// Parse a database from CSV text
    ///
    /// Rows shorter than the header are padded with empty cells. Cells
    /// past the end of the header are kept on the record and written back.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatabaseError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let raw_headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h })
            .map(str::to_string)
            .collect();
        let headers: Vec<String> = raw_headers.iter().map(|h| h.trim().to_string()).collect();

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            let line = index + 2;

            if row.len() > headers.len() {
                warn!(
                    "Row {} has {} cells but the header has {}; extra cells have no column",
                    line,
                    row.len(),
                    headers.len()
                );
            }

            let fields: HashMap<&str, &str> = headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.as_str(), row.get(i).unwrap_or("")))
                .collect();

            let mut record = ModRecord::from_fields(&fields)
                .map_err(|source| DatabaseError::InvalidRow { row: line, source })?;
            record.overflow = row.iter().skip(headers.len()).map(str::to_string).collect();

            for (name, slot) in [
                ("Current", &record.current),
                ("Next", &record.next),
                ("Latest", &record.latest),
            ] {
                if !slot.is_consistent() {
                    warn!(
                        "Row {} ({}): {}Version and {}VersionUrl should be set together",
                        line, record.id, name, name
                    );
                }
            }

            records.push(record);
        }

        let database = Self {
            path: None,
            headers,
            raw_headers,
            records,
        };
        database.warn_duplicates();
        Ok(database)
    }

    fn warn_duplicates(&self) {
        let mut seen = HashSet::new();
        for record in &self.records {
            let key = (
                record.id.to_lowercase(),
                record.mod_type,
                record.loader.as_str().to_lowercase(),
            );
            if !seen.insert(key) {
                warn!("Duplicate record {} in database", record.label());
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[ModRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ModRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append canonical columns missing from the header
    ///
    /// Returns the names of the columns added.
    pub fn ensure_schema(&mut self) -> Vec<String> {
        let existing: HashSet<String> = self.headers.iter().cloned().collect();
        let added: Vec<String> = columns::CANONICAL
            .iter()
            .filter(|column| !existing.contains(**column))
            .map(|column| column.to_string())
            .collect();

        if !added.is_empty() {
            debug!("Adding missing columns: {}", added.join(", "));
            self.headers.extend(added.iter().cloned());
            self.raw_headers.extend(added.iter().cloned());
        }
        added
    }

    pub fn find(&self, id: &str) -> Option<&ModRecord> {
        self.records.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    /// Add a new record; IDs are unique within the same type and loader
    pub fn add_record(&mut self, mut record: ModRecord) -> Result<(), DatabaseError> {
        let duplicate = self.records.iter().any(|existing| {
            existing.id.eq_ignore_ascii_case(&record.id)
                && existing.mod_type == record.mod_type
                && existing.loader.as_str().eq_ignore_ascii_case(record.loader.as_str())
        });

        if duplicate {
            return Err(DatabaseError::DuplicateRecord {
                id: record.id,
                mod_type: record.mod_type,
                loader: record.loader,
            });
        }

        for column in record.extras.keys() {
            if !self.headers.contains(column) {
                self.headers.push(column.clone());
                self.raw_headers.push(column.clone());
            }
        }

        record.refresh_hash();
        self.records.push(record);
        Ok(())
    }

    /// Remove every record matching `id` and the optional filters
    pub fn remove_record(
        &mut self,
        id: &str,
        mod_type: Option<ModType>,
        loader: Option<&Loader>,
    ) -> Result<Vec<ModRecord>, DatabaseError> {
        let matches = |record: &ModRecord| {
            record.id.eq_ignore_ascii_case(id)
                && mod_type.is_none_or(|t| record.mod_type == t)
                && loader.is_none_or(|l| record.loader.as_str().eq_ignore_ascii_case(l.as_str()))
        };

        let (removed, kept): (Vec<ModRecord>, Vec<ModRecord>) =
            std::mem::take(&mut self.records).into_iter().partition(matches);
        self.records = kept;

        if removed.is_empty() {
            return Err(DatabaseError::RecordNotFound { id: id.to_string() });
        }
        Ok(removed)
    }

    /// Write the database as CSV
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), DatabaseError> {
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

        csv_writer.write_record(&self.raw_headers)?;
        for record in &self.records {
            let cells = self
                .headers
                .iter()
                .map(|h| record.value_of(h))
                .chain(record.overflow.iter().cloned());
            csv_writer.write_record(cells)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Save to the file the database was loaded from
    pub fn save(&self) -> Result<(), DatabaseError> {
        let path = self.path.as_deref().ok_or(DatabaseError::NoPath)?;
        self.save_to(path)
    }

    /// Atomically replace `path` with the current contents
    pub fn save_to(&self, path: &Path) -> Result<(), DatabaseError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        self.to_writer(&mut temp)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        debug!("Saved {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    include!("database.test.rs");
}
