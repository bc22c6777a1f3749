//! # Provider API layer
//!
//! One client per hosting service, all behind the [`VersionProvider`]
//! trait. Clients turn a [`VersionQuery`] into provider requests (through
//! [`NetworkingManager::fetch`], so caching and rate limiting apply) and
//! normalize the answer into a [`ResolvedVersion`].
//!
//! ## Modules
//!
//! - [`modrinth`] - Modrinth v2
//! - [`curseforge`] - CurseForge v1 (API key required)
//! - [`github`] - GitHub releases of `owner/repo`
//! - [`mojang`] - Official server jars from the version manifest
//! - [`fabric`] - Fabric Meta installer and server launcher jars
//! - [`mock`] - In-memory provider for tests

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

use crate::modlist::record::{DependencyRef, ModRecord};
use crate::modlist::versions::{compare_versions, is_release_version, sort_versions};
use crate::networking::{CacheKey, NetworkingError, NetworkingManager};
use crate::primitives::{ConfigError, Loader, ModType, ProviderKind};

pub mod curseforge;
pub mod fabric;
pub mod github;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod modrinth;
pub mod mojang;

pub use curseforge::LiveCurseForgeClient;
pub use fabric::LiveFabricClient;
pub use github::LiveGitHubClient;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockVersionProvider;
pub use modrinth::LiveModrinthClient;
pub use mojang::LiveMojangClient;

/// Pinned-version keyword meaning "newest stable release"
pub const LATEST_KEYWORD: &str = "latest";

/// Version resolution errors
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{provider}: '{id}' not found ({reason})")]
    NotFound {
        provider: ProviderKind,
        id: String,
        reason: String,
    },

    #[error("{provider} is not configured: {reason}")]
    Configuration {
        provider: ProviderKind,
        reason: String,
    },

    #[error("Transient provider failure: {source}")]
    Transient {
        #[source]
        source: NetworkingError,
    },

    #[error("Network error: {source}")]
    Network {
        #[source]
        source: NetworkingError,
    },

    #[error("{provider} returned an unexpected response: {message}")]
    InvalidResponse {
        provider: ProviderKind,
        message: String,
    },
}

impl ResolveError {
    pub fn not_found(provider: ProviderKind, id: &str, reason: impl Into<String>) -> Self {
        ResolveError::NotFound {
            provider,
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}

impl From<NetworkingError> for ResolveError {
    fn from(source: NetworkingError) -> Self {
        if source.is_transient() || matches!(source, NetworkingError::CacheMiss { .. }) {
            ResolveError::Transient { source }
        } else {
            ResolveError::Network { source }
        }
    }
}

/// What to resolve: one project for one loader and game version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionQuery {
    pub id: String,
    pub loader: Loader,
    pub mod_type: ModType,
    /// Only releases supporting this game version
    pub game_version: Option<String>,
    /// Pinned version, or [`LATEST_KEYWORD`]
    pub version: Option<String>,
    /// Ignore releases that only support newer game versions
    pub game_version_ceiling: Option<String>,
}

impl VersionQuery {
    pub fn new(id: impl Into<String>, loader: Loader, mod_type: ModType) -> Self {
        Self {
            id: id.into(),
            loader,
            mod_type,
            game_version: None,
            version: None,
            game_version_ceiling: None,
        }
    }

    /// Query for a database row
    pub fn for_record(record: &ModRecord) -> Self {
        Self::new(record.id.clone(), record.loader.clone(), record.mod_type)
    }

    pub fn with_game_version(mut self, game_version: Option<&str>) -> Self {
        self.game_version = game_version
            .map(str::trim)
            .filter(|gv| !gv.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_ceiling(mut self, ceiling: Option<&str>) -> Self {
        self.game_version_ceiling = ceiling
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        self
    }

    /// Pinned version unless it is the `latest` keyword
    pub fn pinned_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .filter(|v| !v.eq_ignore_ascii_case(LATEST_KEYWORD))
    }

    pub fn wants_latest_keyword(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case(LATEST_KEYWORD))
    }

    fn within_ceiling(&self, game_version: &str) -> bool {
        self.game_version_ceiling
            .as_deref()
            .is_none_or(|ceiling| compare_versions(game_version, ceiling) != Ordering::Greater)
    }
}

/// A release picked for a query, normalized across providers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    pub download_url: String,
    pub jar_filename: String,
    pub game_version: String,
    pub dependencies: Vec<DependencyRef>,
    /// Every release game version reported for the project and loader
    pub available_game_versions: Vec<String>,
    pub sha1: Option<String>,
}

/// Descriptive project data used when adding a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Identifier to store in the `ID` column
    pub id: String,
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
    /// Canonical project page
    pub url: String,
    pub mod_type: Option<ModType>,
}

impl ProjectMetadata {
    /// Copy the descriptive fields onto a record
    pub fn apply_to(&self, record: &mut ModRecord) {
        record.name = self.name.clone();
        record.title = self.title.clone();
        record.description = self.description.clone();
        record.category = self.category.clone();
        record.icon_url = self.icon_url.clone();
        record.client_side = self.client_side.clone();
        record.server_side = self.server_side.clone();
        record.issues_url = self.issues_url.clone();
        record.source_url = self.source_url.clone();
        record.wiki_url = self.wiki_url.clone();
        if !self.url.is_empty() {
            record.url = self.url.clone();
        }
    }
}

/// One downloadable release as reported by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseCandidate {
    pub version: String,
    pub download_url: String,
    pub file_name: String,
    pub game_versions: Vec<String>,
    /// Lowercase loader labels; empty when the provider reports none
    pub loaders: Vec<String>,
    pub prerelease: bool,
    /// RFC 3339 timestamp
    pub published: String,
    pub dependencies: Vec<DependencyRef>,
    pub sha1: Option<String>,
}

impl ReleaseCandidate {
    fn supports_loader(&self, loader: &Loader) -> bool {
        self.loaders.is_empty() || self.loaders.iter().any(|label| loader.matches(label))
    }

    fn supports_game_version(&self, game_version: &str) -> bool {
        self.game_versions.is_empty() || self.game_versions.iter().any(|gv| gv == game_version)
    }
}

/// Pick the release a query asks for
///
/// Loader filtering only applies to loader-specific types. Candidates that
/// advertise no game versions match any requested one. Stable releases win
/// over prereleases; among the rest the most recently published wins, with
/// ties broken by version order.
pub fn select_release<'a>(
    candidates: &'a [ReleaseCandidate],
    query: &VersionQuery,
) -> Option<&'a ReleaseCandidate> {
    let loader_specific = query.mod_type.is_loader_specific();
    let pinned = query.pinned_version();

    let matching: Vec<&ReleaseCandidate> = candidates
        .iter()
        .filter(|c| !loader_specific || c.supports_loader(&query.loader))
        .filter(|c| {
            query
                .game_version
                .as_deref()
                .is_none_or(|gv| c.supports_game_version(gv))
        })
        .filter(|c| {
            query.game_version_ceiling.is_none()
                || c.game_versions.is_empty()
                || c.game_versions.iter().any(|gv| query.within_ceiling(gv))
        })
        .filter(|c| pinned.is_none_or(|v| same_version(&c.version, v)))
        .filter(|c| !(query.wants_latest_keyword() && c.prerelease))
        .collect();

    let has_stable = matching.iter().any(|c| !c.prerelease);

    matching
        .into_iter()
        .filter(|c| !has_stable || !c.prerelease)
        .max_by(|a, b| {
            a.published
                .cmp(&b.published)
                .then_with(|| compare_versions(&a.version, &b.version))
        })
}

/// Release game versions of every candidate usable with the query's loader
pub fn available_game_versions(candidates: &[ReleaseCandidate], query: &VersionQuery) -> Vec<String> {
    let loader_specific = query.mod_type.is_loader_specific();
    sort_versions(
        candidates
            .iter()
            .filter(|c| !loader_specific || c.supports_loader(&query.loader))
            .flat_map(|c| c.game_versions.iter())
            .filter(|gv| is_release_version(gv))
            .cloned()
            .collect(),
    )
}

/// Select a release and normalize it
pub fn resolve_from_candidates(
    provider: ProviderKind,
    candidates: &[ReleaseCandidate],
    query: &VersionQuery,
) -> Result<ResolvedVersion, ResolveError> {
    let selected = select_release(candidates, query).ok_or_else(|| {
        ResolveError::not_found(provider, &query.id, describe_filters(query))
    })?;

    let game_version = match &query.game_version {
        Some(gv) => gv.clone(),
        None => crate::modlist::versions::highest_version(
            selected
                .game_versions
                .iter()
                .map(String::as_str)
                .filter(|gv| is_release_version(gv) && query.within_ceiling(gv)),
        )
        .unwrap_or_default(),
    };

    Ok(ResolvedVersion {
        version: selected.version.clone(),
        download_url: selected.download_url.clone(),
        jar_filename: selected.file_name.clone(),
        game_version,
        dependencies: selected.dependencies.clone(),
        available_game_versions: available_game_versions(candidates, query),
        sha1: selected.sha1.clone(),
    })
}

fn describe_filters(query: &VersionQuery) -> String {
    let mut parts = Vec::new();
    if query.mod_type.is_loader_specific() && !query.loader.is_unspecified() {
        parts.push(format!("loader {}", query.loader));
    }
    if let Some(gv) = &query.game_version {
        parts.push(format!("game version {}", gv));
    }
    if let Some(ceiling) = &query.game_version_ceiling {
        parts.push(format!("game version <= {}", ceiling));
    }
    if let Some(version) = &query.version {
        parts.push(format!("version {}", version));
    }

    if parts.is_empty() {
        "no releases".to_string()
    } else {
        format!("no release for {}", parts.join(", "))
    }
}

fn same_version(candidate: &str, pinned: &str) -> bool {
    let strip = |v: &str| {
        let v = v.trim();
        v.strip_prefix(['v', 'V']).unwrap_or(v).to_string()
    };
    strip(candidate).eq_ignore_ascii_case(&strip(pinned))
}

pub type ResolveFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ResolveError>> + Send + 'a>>;

/// A source of versions and project metadata
///
/// Dyn-compatible so the registry can dispatch on [`ProviderKind`].
pub trait VersionProvider: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Whether the provider has what it needs (API keys) to answer
    fn is_configured(&self) -> bool {
        true
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion>;

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata>;
}

/// Base URLs and credentials for the live clients
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub base_urls: HashMap<ProviderKind, String>,
    pub curseforge_api_key: Option<String>,
    pub github_token: Option<String>,
}

impl ProviderSettings {
    /// Base URL for a provider, without a trailing slash
    pub fn base_url(&self, provider: ProviderKind) -> String {
        self.base_urls
            .get(&provider)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(provider.api_base_url())
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
}

/// Provider clients by kind
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn VersionProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.providers.keys().collect();
        kinds.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &kinds)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every live client, sharing one networking manager
    pub fn live(networking: Arc<NetworkingManager>, settings: &ProviderSettings) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LiveModrinthClient::with_base_url(
            networking.clone(),
            settings.base_url(ProviderKind::Modrinth),
        )));
        registry.register(Arc::new(LiveCurseForgeClient::with_base_url(
            networking.clone(),
            settings.base_url(ProviderKind::CurseForge),
            settings.curseforge_api_key.clone(),
        )));
        registry.register(Arc::new(LiveGitHubClient::with_base_url(
            networking.clone(),
            settings.base_url(ProviderKind::GitHub),
            settings.github_token.clone(),
        )));
        registry.register(Arc::new(LiveMojangClient::with_base_url(
            networking.clone(),
            settings.base_url(ProviderKind::Mojang),
        )));
        registry.register(Arc::new(LiveFabricClient::with_base_url(
            networking,
            settings.base_url(ProviderKind::Fabric),
        )));
        registry
    }

    pub fn register(&mut self, provider: Arc<dyn VersionProvider>) {
        trace!("Registering {} provider", provider.provider());
        self.providers.insert(provider.provider(), provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn VersionProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Result<&dyn VersionProvider, ResolveError> {
        self.providers
            .get(&kind)
            .map(|provider| provider.as_ref())
            .ok_or_else(|| ResolveError::Configuration {
                provider: kind,
                reason: "no client registered".to_string(),
            })
    }

    /// Fail fast when a provider some row needs lacks its credentials
    pub fn ensure_configured<I>(&self, kinds: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = ProviderKind>,
    {
        for kind in kinds {
            let Some(provider) = self.providers.get(&kind) else {
                continue;
            };
            if !provider.is_configured() {
                return Err(ConfigError::MissingApiKey {
                    provider: kind,
                    env_var: kind.api_key_env_var().unwrap_or("an API key"),
                });
            }
        }
        Ok(())
    }

    pub async fn resolve(
        &self,
        kind: ProviderKind,
        query: &VersionQuery,
    ) -> Result<ResolvedVersion, ResolveError> {
        self.get(kind)?.resolve_version(query).await
    }

    pub async fn project(&self, kind: ProviderKind, id: &str) -> Result<ProjectMetadata, ResolveError> {
        self.get(kind)?.fetch_project(id).await
    }
}

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a path segment or query value
pub(crate) fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Fetch and decode a provider response; `None` on 404
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    networking: &NetworkingManager,
    key: &CacheKey,
    url: &str,
    headers: HeaderMap,
) -> Result<Option<T>, ResolveError> {
    let response = networking.fetch(key, url, headers).await?;
    if response.is_not_found() {
        return Ok(None);
    }

    serde_json::from_value(response.data)
        .map(Some)
        .map_err(|e| ResolveError::InvalidResponse {
            provider: key.provider(),
            message: format!("{}: {}", key, e),
        })
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
