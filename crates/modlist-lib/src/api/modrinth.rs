//! Modrinth API client
//!
//! Uses NetworkingManager for HTTP requests with caching and rate limiting.
//! The full version list of a project is fetched once and filtered locally,
//! so one cached response serves every slot of a row.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{
    ProjectMetadata, ReleaseCandidate, ResolveError, ResolveFuture, ResolvedVersion,
    VersionProvider, VersionQuery, encode, fetch_json, resolve_from_candidates,
};
use crate::modlist::record::DependencyRef;
use crate::networking::{CacheKey, NetworkingManager};
use crate::primitives::{ModType, ProviderKind};

/// Dependency relationship type
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

/// Version dependency
#[derive(Debug, Clone, Deserialize)]
pub struct VersionDependency {
    pub version_id: Option<String>,
    pub project_id: Option<String>,
    pub dependency_type: DependencyType,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileHashes {
    pub sha1: Option<String>,
}

/// Version file
#[derive(Debug, Clone, Deserialize)]
pub struct VersionFile {
    #[serde(default)]
    pub hashes: FileHashes,
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
}

/// Version information
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    pub version_number: String,
    #[serde(default)]
    pub dependencies: Vec<VersionDependency>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub version_type: String,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub date_published: String,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

impl Version {
    /// Primary file, or the first one when none is flagged
    pub fn primary_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|file| file.primary)
            .or_else(|| self.files.first())
    }

    fn into_candidate(self) -> Option<ReleaseCandidate> {
        let file = self.primary_file()?.clone();

        let dependencies = self
            .dependencies
            .iter()
            .filter_map(|dep| {
                let required = match dep.dependency_type {
                    DependencyType::Required => true,
                    DependencyType::Optional => false,
                    DependencyType::Incompatible | DependencyType::Embedded => return None,
                };
                Some(DependencyRef {
                    project_id: dep.project_id.clone()?,
                    file_id: dep.version_id.clone(),
                    required,
                    host: ProviderKind::Modrinth,
                })
            })
            .collect();

        Some(ReleaseCandidate {
            version: self.version_number,
            download_url: file.url,
            file_name: file.filename,
            game_versions: self.game_versions,
            loaders: self.loaders.iter().map(|l| l.to_lowercase()).collect(),
            prerelease: self.version_type != "release",
            published: self.date_published,
            dependencies,
            sha1: file.hashes.sha1,
        })
    }
}

/// Project information
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub client_side: String,
    #[serde(default)]
    pub server_side: String,
    #[serde(default)]
    pub project_type: String,
    pub icon_url: Option<String>,
    pub issues_url: Option<String>,
    pub source_url: Option<String>,
    pub wiki_url: Option<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
}

impl Project {
    /// Modrinth lists datapacks as mods loaded by `datapack`
    pub fn mod_type(&self) -> Option<ModType> {
        match self.project_type.as_str() {
            "mod" if self.loaders.len() == 1 && self.loaders[0] == "datapack" => {
                Some(ModType::Datapack)
            }
            "mod" => Some(ModType::Mod),
            "modpack" => Some(ModType::Modpack),
            "shader" => Some(ModType::Shader),
            "resourcepack" => Some(ModType::Resourcepack),
            "datapack" => Some(ModType::Datapack),
            "plugin" => Some(ModType::Plugin),
            _ => None,
        }
    }

    fn into_metadata(self) -> ProjectMetadata {
        let mod_type = self.mod_type();
        let page_type = mod_type.map(|t| t.as_str()).unwrap_or("mod");
        ProjectMetadata {
            url: format!("https://modrinth.com/{}/{}", page_type, self.slug),
            id: self.slug,
            name: self.title.clone(),
            title: self.title,
            description: self.description,
            category: self.categories.join(","),
            icon_url: self.icon_url.unwrap_or_default(),
            client_side: self.client_side,
            server_side: self.server_side,
            issues_url: self.issues_url.unwrap_or_default(),
            source_url: self.source_url.unwrap_or_default(),
            wiki_url: self.wiki_url.unwrap_or_default(),
            mod_type,
        }
    }
}

/// Live Modrinth API client (production)
pub struct LiveModrinthClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
}

impl LiveModrinthClient {
    pub fn new(networking: Arc<NetworkingManager>) -> Self {
        Self::with_base_url(networking, ProviderKind::Modrinth.api_base_url().to_string())
    }

    /// Create client with custom base URL (for staging/testing)
    pub fn with_base_url(networking: Arc<NetworkingManager>, base_url: String) -> Self {
        Self {
            networking,
            base_url,
        }
    }

    pub async fn get_project(&self, id: &str) -> Result<Project, ResolveError> {
        let key = CacheKey::new(ProviderKind::Modrinth, &[("endpoint", "project"), ("id", id)]);
        let url = format!("{}/project/{}", self.base_url, encode(id));

        fetch_json(&self.networking, &key, &url, HeaderMap::new())
            .await?
            .ok_or_else(|| ResolveError::not_found(ProviderKind::Modrinth, id, "no such project"))
    }

    pub async fn get_versions(&self, id: &str) -> Result<Vec<Version>, ResolveError> {
        let key = CacheKey::new(ProviderKind::Modrinth, &[("endpoint", "versions"), ("id", id)]);
        let url = format!("{}/project/{}/version", self.base_url, encode(id));

        fetch_json(&self.networking, &key, &url, HeaderMap::new())
            .await?
            .ok_or_else(|| ResolveError::not_found(ProviderKind::Modrinth, id, "no such project"))
    }

    async fn resolve(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        let versions = self.get_versions(&query.id).await?;
        debug!("Modrinth reports {} versions for {}", versions.len(), query.id);

        let candidates: Vec<ReleaseCandidate> = versions
            .into_iter()
            .filter_map(Version::into_candidate)
            .collect();
        resolve_from_candidates(ProviderKind::Modrinth, &candidates, query)
    }
}

impl VersionProvider for LiveModrinthClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Modrinth
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion> {
        Box::pin(self.resolve(query))
    }

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata> {
        Box::pin(async move { Ok(self.get_project(id).await?.into_metadata()) })
    }
}

#[cfg(test)]
mod tests {
    include!("modrinth.test.rs");
}
