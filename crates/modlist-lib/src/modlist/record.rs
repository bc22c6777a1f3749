//! Database row model
//!
//! A [`ModRecord`] is a fixed-field view of one CSV row. Columns the tool
//! does not know about are carried in [`ModRecord::extras`] and written
//! back untouched. Known columns remember the text they were loaded with
//! and write it back verbatim until their parsed value changes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::primitives::{Loader, ModGroup, ModType, ProviderKind, SlotKind, sha256_hex};

/// Column names of the database, in canonical order
pub mod columns {
    pub const GROUP: &str = "Group";
    pub const TYPE: &str = "Type";
    pub const CURRENT_GAME_VERSION: &str = "CurrentGameVersion";
    pub const ID: &str = "ID";
    pub const LOADER: &str = "Loader";
    pub const CURRENT_VERSION: &str = "CurrentVersion";
    pub const NAME: &str = "Name";
    pub const DESCRIPTION: &str = "Description";
    pub const JAR: &str = "Jar";
    pub const URL: &str = "Url";
    pub const CATEGORY: &str = "Category";
    pub const CURRENT_VERSION_URL: &str = "CurrentVersionUrl";
    pub const NEXT_GAME_VERSION: &str = "NextGameVersion";
    pub const NEXT_VERSION: &str = "NextVersion";
    pub const NEXT_VERSION_URL: &str = "NextVersionUrl";
    pub const LATEST_GAME_VERSION: &str = "LatestGameVersion";
    pub const LATEST_VERSION: &str = "LatestVersion";
    pub const LATEST_VERSION_URL: &str = "LatestVersionUrl";
    pub const API_SOURCE: &str = "ApiSource";
    pub const HOST: &str = "Host";
    pub const ICON_URL: &str = "IconUrl";
    pub const CLIENT_SIDE: &str = "ClientSide";
    pub const SERVER_SIDE: &str = "ServerSide";
    pub const TITLE: &str = "Title";
    pub const ISSUES_URL: &str = "IssuesUrl";
    pub const SOURCE_URL: &str = "SourceUrl";
    pub const WIKI_URL: &str = "WikiUrl";
    pub const AVAILABLE_GAME_VERSIONS: &str = "AvailableGameVersions";
    pub const CURRENT_DEPENDENCIES_REQUIRED: &str = "CurrentDependenciesRequired";
    pub const CURRENT_DEPENDENCIES_OPTIONAL: &str = "CurrentDependenciesOptional";
    pub const LATEST_DEPENDENCIES_REQUIRED: &str = "LatestDependenciesRequired";
    pub const LATEST_DEPENDENCIES_OPTIONAL: &str = "LatestDependenciesOptional";
    pub const RECORD_HASH: &str = "RecordHash";

    /// Header written for new databases and used to append missing columns
    pub const CANONICAL: [&str; 33] = [
        GROUP,
        TYPE,
        CURRENT_GAME_VERSION,
        ID,
        LOADER,
        CURRENT_VERSION,
        NAME,
        DESCRIPTION,
        JAR,
        URL,
        CATEGORY,
        CURRENT_VERSION_URL,
        NEXT_GAME_VERSION,
        NEXT_VERSION,
        NEXT_VERSION_URL,
        LATEST_GAME_VERSION,
        LATEST_VERSION,
        LATEST_VERSION_URL,
        API_SOURCE,
        HOST,
        ICON_URL,
        CLIENT_SIDE,
        SERVER_SIDE,
        TITLE,
        ISSUES_URL,
        SOURCE_URL,
        WIKI_URL,
        AVAILABLE_GAME_VERSIONS,
        CURRENT_DEPENDENCIES_REQUIRED,
        CURRENT_DEPENDENCIES_OPTIONAL,
        LATEST_DEPENDENCIES_REQUIRED,
        LATEST_DEPENDENCIES_OPTIONAL,
        RECORD_HASH,
    ];

    /// Columns covered by the record hash, in hashing order
    pub const HASHED: [&str; 22] = [
        GROUP,
        TYPE,
        ID,
        LOADER,
        API_SOURCE,
        HOST,
        URL,
        CURRENT_VERSION,
        CURRENT_VERSION_URL,
        CURRENT_GAME_VERSION,
        NEXT_VERSION,
        NEXT_VERSION_URL,
        NEXT_GAME_VERSION,
        LATEST_VERSION,
        LATEST_VERSION_URL,
        LATEST_GAME_VERSION,
        JAR,
        AVAILABLE_GAME_VERSIONS,
        CURRENT_DEPENDENCIES_REQUIRED,
        CURRENT_DEPENDENCIES_OPTIONAL,
        LATEST_DEPENDENCIES_REQUIRED,
        LATEST_DEPENDENCIES_OPTIONAL,
    ];

    pub fn is_known(name: &str) -> bool {
        CANONICAL.contains(&name)
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid value '{value}' in column {column}: {reason}")]
    InvalidField {
        column: &'static str,
        value: String,
        reason: String,
    },
}

/// One of the Current/Next/Latest version tuples
///
/// The version and its download URL are set and cleared together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSlot {
    pub version: String,
    pub url: String,
    pub game_version: String,
}

impl VersionSlot {
    pub fn resolved(
        version: impl Into<String>,
        url: impl Into<String>,
        game_version: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            url: url.into(),
            game_version: game_version.into(),
        }
    }

    /// Both version and URL are present
    pub fn is_resolved(&self) -> bool {
        !self.version.trim().is_empty() && !self.url.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.version.trim().is_empty() && self.url.trim().is_empty()
    }

    /// Version and URL are either both set or both empty
    pub fn is_consistent(&self) -> bool {
        self.is_resolved() || self.is_empty()
    }

    pub fn clear(&mut self) {
        self.version.clear();
        self.url.clear();
        self.game_version.clear();
    }
}

/// A dependency of one specific release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRef {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub required: bool,
    pub host: ProviderKind,
}

/// Required and optional dependencies of a release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub required: Vec<DependencyRef>,
    pub optional: Vec<DependencyRef>,
}

impl Dependencies {
    /// Split a flat list by its `required` flag
    pub fn from_refs(refs: Vec<DependencyRef>) -> Self {
        let (required, optional) = refs.into_iter().partition(|dep| dep.required);
        Self { required, optional }
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

/// One row of the mod database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModRecord {
    pub group: ModGroup,
    pub mod_type: ModType,
    pub id: String,
    pub loader: Loader,
    pub current: VersionSlot,
    pub next: VersionSlot,
    pub latest: VersionSlot,
    pub jar: String,
    pub provider: ProviderKind,
    pub host: String,
    pub url: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub icon_url: String,
    pub client_side: String,
    pub server_side: String,
    pub issues_url: String,
    pub source_url: String,
    pub wiki_url: String,
    pub available_game_versions: Vec<String>,
    pub current_dependencies: Dependencies,
    pub latest_dependencies: Dependencies,
    pub record_hash: String,
    /// Unknown columns, keyed by header name
    pub extras: BTreeMap<String, String>,
    /// Cells past the end of the header row, written back after the last column
    pub overflow: Vec<String>,
    /// Known columns as read from the file
    loaded: BTreeMap<&'static str, LoadedCell>,
}

/// Raw text of a cell and the value it parsed to
#[derive(Debug, Clone, PartialEq, Eq)]
struct LoadedCell {
    raw: String,
    parsed: String,
}

impl ModRecord {
    pub fn new(id: impl Into<String>, mod_type: ModType, loader: Loader) -> Self {
        Self {
            id: id.into(),
            mod_type,
            loader,
            ..Self::default()
        }
    }

    pub fn slot(&self, kind: SlotKind) -> &VersionSlot {
        match kind {
            SlotKind::Current => &self.current,
            SlotKind::Next => &self.next,
            SlotKind::Latest => &self.latest,
        }
    }

    /// Short label for logs: `fabric-api (mod/fabric)`
    pub fn label(&self) -> String {
        if self.loader.is_unspecified() {
            format!("{} ({})", self.id, self.mod_type)
        } else {
            format!("{} ({}/{})", self.id, self.mod_type, self.loader)
        }
    }

    /// Build a record from a row given as column -> value
    ///
    /// Missing columns read as empty; columns outside the canonical set go
    /// to `extras`.
    pub fn from_fields(fields: &HashMap<&str, &str>) -> Result<Self, RecordError> {
        use columns::*;

        let get = |column: &str| fields.get(column).map(|v| v.trim()).unwrap_or_default();
        let text = |column: &str| get(column).to_string();

        let group = parse_or_default(GROUP, get(GROUP))?;
        let mod_type = parse_or_default(TYPE, get(TYPE))?;
        let url = text(URL);

        let provider = match get(API_SOURCE) {
            "" => get(HOST)
                .parse::<ProviderKind>()
                .unwrap_or_else(|_| ProviderKind::from_url(&url)),
            source => parse_field(API_SOURCE, source)?,
        };

        let extras = fields
            .iter()
            .filter(|(name, _)| !columns::is_known(name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let mut record = Self {
            group,
            mod_type,
            id: text(ID),
            loader: Loader::parse(get(LOADER)),
            current: VersionSlot::resolved(
                text(CURRENT_VERSION),
                text(CURRENT_VERSION_URL),
                text(CURRENT_GAME_VERSION),
            ),
            next: VersionSlot::resolved(
                text(NEXT_VERSION),
                text(NEXT_VERSION_URL),
                text(NEXT_GAME_VERSION),
            ),
            latest: VersionSlot::resolved(
                text(LATEST_VERSION),
                text(LATEST_VERSION_URL),
                text(LATEST_GAME_VERSION),
            ),
            jar: text(JAR),
            provider,
            host: text(HOST),
            url,
            name: text(NAME),
            title: text(TITLE),
            description: text(DESCRIPTION),
            category: text(CATEGORY),
            icon_url: text(ICON_URL),
            client_side: text(CLIENT_SIDE),
            server_side: text(SERVER_SIDE),
            issues_url: text(ISSUES_URL),
            source_url: text(SOURCE_URL),
            wiki_url: text(WIKI_URL),
            available_game_versions: split_list(get(AVAILABLE_GAME_VERSIONS)),
            current_dependencies: Dependencies {
                required: parse_dependencies(
                    CURRENT_DEPENDENCIES_REQUIRED,
                    get(CURRENT_DEPENDENCIES_REQUIRED),
                )?,
                optional: parse_dependencies(
                    CURRENT_DEPENDENCIES_OPTIONAL,
                    get(CURRENT_DEPENDENCIES_OPTIONAL),
                )?,
            },
            latest_dependencies: Dependencies {
                required: parse_dependencies(
                    LATEST_DEPENDENCIES_REQUIRED,
                    get(LATEST_DEPENDENCIES_REQUIRED),
                )?,
                optional: parse_dependencies(
                    LATEST_DEPENDENCIES_OPTIONAL,
                    get(LATEST_DEPENDENCIES_OPTIONAL),
                )?,
            },
            record_hash: text(RECORD_HASH),
            extras,
            overflow: Vec::new(),
            loaded: BTreeMap::new(),
        };

        for column in CANONICAL {
            if let (Some(raw), Some(parsed)) = (fields.get(column), record.field(column)) {
                let cell = LoadedCell {
                    raw: raw.to_string(),
                    parsed,
                };
                record.loaded.insert(column, cell);
            }
        }
        Ok(record)
    }

    /// Serialized value of a canonical column
    ///
    /// `None` for columns outside the canonical set; see [`Self::value_of`]
    /// for a lookup that includes `extras`.
    pub fn field(&self, column: &str) -> Option<String> {
        use columns::*;

        let value = match column {
            GROUP => self.group.to_string(),
            TYPE => self.mod_type.to_string(),
            CURRENT_GAME_VERSION => self.current.game_version.clone(),
            ID => self.id.clone(),
            LOADER => self.loader.to_string(),
            CURRENT_VERSION => self.current.version.clone(),
            NAME => self.name.clone(),
            DESCRIPTION => self.description.clone(),
            JAR => self.jar.clone(),
            URL => self.url.clone(),
            CATEGORY => self.category.clone(),
            CURRENT_VERSION_URL => self.current.url.clone(),
            NEXT_GAME_VERSION => self.next.game_version.clone(),
            NEXT_VERSION => self.next.version.clone(),
            NEXT_VERSION_URL => self.next.url.clone(),
            LATEST_GAME_VERSION => self.latest.game_version.clone(),
            LATEST_VERSION => self.latest.version.clone(),
            LATEST_VERSION_URL => self.latest.url.clone(),
            API_SOURCE => self.provider.to_string(),
            HOST => self.host.clone(),
            ICON_URL => self.icon_url.clone(),
            CLIENT_SIDE => self.client_side.clone(),
            SERVER_SIDE => self.server_side.clone(),
            TITLE => self.title.clone(),
            ISSUES_URL => self.issues_url.clone(),
            SOURCE_URL => self.source_url.clone(),
            WIKI_URL => self.wiki_url.clone(),
            AVAILABLE_GAME_VERSIONS => self.available_game_versions.join(","),
            CURRENT_DEPENDENCIES_REQUIRED => format_dependencies(&self.current_dependencies.required),
            CURRENT_DEPENDENCIES_OPTIONAL => format_dependencies(&self.current_dependencies.optional),
            LATEST_DEPENDENCIES_REQUIRED => format_dependencies(&self.latest_dependencies.required),
            LATEST_DEPENDENCIES_OPTIONAL => format_dependencies(&self.latest_dependencies.optional),
            RECORD_HASH => self.record_hash.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Value to write under `column`, empty when the row has none
    ///
    /// A known column whose value is unchanged since load keeps its
    /// original text, padding and casing included.
    pub fn value_of(&self, column: &str) -> String {
        match self.field(column) {
            Some(value) => match self.loaded.get(column) {
                Some(cell) if cell.parsed == value => cell.raw.clone(),
                _ => value,
            },
            None => self.extras.get(column).cloned().unwrap_or_default(),
        }
    }

    /// Content hash over the semantically significant fields
    ///
    /// Display-only columns, unknown columns and the stored hash itself are
    /// excluded, so editing a description never counts as drift.
    pub fn compute_hash(&self) -> String {
        let mut canonical = String::new();
        for column in columns::HASHED {
            let value = self.field(column).unwrap_or_default();
            canonical.push_str(column);
            canonical.push('=');
            canonical.push_str(&value);
            canonical.push('\n');
        }
        sha256_hex(canonical.as_bytes())
    }

    /// Recompute and store the record hash
    pub fn refresh_hash(&mut self) {
        self.record_hash = self.compute_hash();
    }

    /// Stored hash is present and disagrees with the row's content
    pub fn has_drifted(&self) -> bool {
        !self.record_hash.is_empty() && self.record_hash != self.compute_hash()
    }
}

fn parse_field<T>(column: &'static str, value: &str) -> Result<T, RecordError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| RecordError::InvalidField {
        column,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or_default<T>(column: &'static str, value: &str) -> Result<T, RecordError>
where
    T: std::str::FromStr + Default,
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        Ok(T::default())
    } else {
        parse_field(column, value)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_dependencies(column: &'static str, value: &str) -> Result<Vec<DependencyRef>, RecordError> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(value).map_err(|e| RecordError::InvalidField {
        column,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Compact JSON, empty string for an empty list
pub fn format_dependencies(deps: &[DependencyRef]) -> String {
    if deps.is_empty() {
        String::new()
    } else {
        serde_json::to_string(deps).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    include!("record.test.rs");
}
