//! CurseForge API client
//!
//! Every request carries the `x-api-key` header. A client built without a
//! key reports itself unconfigured so the registry can refuse to start
//! before any row is processed.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{
    ProjectMetadata, ReleaseCandidate, ResolveError, ResolveFuture, ResolvedVersion,
    VersionProvider, VersionQuery, encode, fetch_json, resolve_from_candidates,
};
use crate::modlist::record::DependencyRef;
use crate::modlist::versions::is_release_version;
use crate::networking::{CacheKey, NetworkingManager};
use crate::primitives::{ModType, ProviderKind};

/// Minecraft's game id on CurseForge
pub const MINECRAFT_GAME_ID: u32 = 432;

/// Files requested per page
pub const PAGE_SIZE: usize = 50;

/// Upper bound on pages walked for one project
const MAX_PAGES: usize = 200;

const RELATION_OPTIONAL: u32 = 2;
const RELATION_REQUIRED: u32 = 3;
const RELEASE_TYPE_RELEASE: u32 = 1;
const HASH_ALGO_SHA1: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub index: usize,
    #[serde(rename = "resultCount")]
    pub result_count: usize,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilesPage {
    pub data: Vec<CurseFile>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModLinks {
    pub website_url: Option<String>,
    pub wiki_url: Option<String>,
    pub issues_url: Option<String>,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logo {
    pub url: String,
}

/// Project as returned by `/v1/mods`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseMod {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub links: ModLinks,
    pub logo: Option<Logo>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub class_id: Option<u32>,
}

impl CurseMod {
    pub fn mod_type(&self) -> Option<ModType> {
        match self.class_id? {
            6 => Some(ModType::Mod),
            4471 => Some(ModType::Modpack),
            12 => Some(ModType::Resourcepack),
            6552 => Some(ModType::Shader),
            6945 => Some(ModType::Datapack),
            5 => Some(ModType::Plugin),
            _ => None,
        }
    }

    fn into_metadata(self) -> ProjectMetadata {
        let mod_type = self.mod_type();
        let url = self.links.website_url.clone().unwrap_or_else(|| {
            format!("https://www.curseforge.com/minecraft/mc-mods/{}", self.slug)
        });

        ProjectMetadata {
            id: self.slug,
            name: self.name.clone(),
            title: self.name,
            description: self.summary,
            category: self
                .categories
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(","),
            icon_url: self.logo.map(|logo| logo.url).unwrap_or_default(),
            client_side: String::new(),
            server_side: String::new(),
            issues_url: self.links.issues_url.unwrap_or_default(),
            source_url: self.links.source_url.unwrap_or_default(),
            wiki_url: self.links.wiki_url.unwrap_or_default(),
            url,
            mod_type,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDependency {
    pub mod_id: u64,
    pub relation_type: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileHash {
    pub value: String,
    pub algo: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseFile {
    pub id: u64,
    #[serde(default)]
    pub display_name: String,
    pub file_name: String,
    #[serde(default)]
    pub release_type: u32,
    #[serde(default)]
    pub file_date: String,
    pub download_url: Option<String>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<FileDependency>,
    #[serde(default)]
    pub hashes: Vec<FileHash>,
}

impl CurseFile {
    /// Download URL, falling back to the CDN edge path when the author
    /// disabled third-party distribution
    pub fn download_url(&self) -> String {
        match self.download_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => url.to_string(),
            None => edge_url(self.id, &self.file_name),
        }
    }

    fn into_candidate(self) -> ReleaseCandidate {
        let (loaders, game_versions) = split_game_versions(&self.game_versions);
        let version = if self.display_name.trim().is_empty() {
            self.file_name
                .rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or_else(|| self.file_name.clone())
        } else {
            self.display_name.trim().to_string()
        };

        let dependencies = self
            .dependencies
            .iter()
            .filter_map(|dep| {
                let required = match dep.relation_type {
                    RELATION_REQUIRED => true,
                    RELATION_OPTIONAL => false,
                    _ => return None,
                };
                Some(DependencyRef {
                    project_id: dep.mod_id.to_string(),
                    file_id: None,
                    required,
                    host: ProviderKind::CurseForge,
                })
            })
            .collect();

        ReleaseCandidate {
            download_url: self.download_url(),
            version,
            file_name: self.file_name,
            game_versions,
            loaders,
            prerelease: self.release_type != RELEASE_TYPE_RELEASE,
            published: self.file_date,
            dependencies,
            sha1: self
                .hashes
                .into_iter()
                .find(|hash| hash.algo == HASH_ALGO_SHA1)
                .map(|hash| hash.value),
        }
    }
}

/// `https://edge.forgecdn.net/files/{id / 1000}/{id % 1000}/{file}`
pub fn edge_url(file_id: u64, file_name: &str) -> String {
    format!(
        "https://edge.forgecdn.net/files/{}/{}/{}",
        file_id / 1000,
        file_id % 1000,
        encode(file_name)
    )
}

/// Split CurseForge's mixed `gameVersions` list into loaders and game versions
///
/// Environment tags (`Client`, `Server`) and Java versions are dropped.
pub fn split_game_versions(entries: &[String]) -> (Vec<String>, Vec<String>) {
    let mut loaders = Vec::new();
    let mut game_versions = Vec::new();

    for entry in entries {
        let entry = entry.trim();
        if is_release_version(entry) || entry.starts_with(|c: char| c.is_ascii_digit()) {
            game_versions.push(entry.to_string());
            continue;
        }
        let label = entry.to_lowercase();
        if matches!(label.as_str(), "client" | "server") || label.starts_with("java") {
            continue;
        }
        loaders.push(label);
    }

    (loaders, game_versions)
}

/// Live CurseForge API client (production)
pub struct LiveCurseForgeClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
    api_key: Option<String>,
}

impl LiveCurseForgeClient {
    pub fn new(networking: Arc<NetworkingManager>, api_key: Option<String>) -> Self {
        Self::with_base_url(
            networking,
            ProviderKind::CurseForge.api_base_url().to_string(),
            api_key,
        )
    }

    /// Create client with custom base URL (for staging/testing)
    pub fn with_base_url(
        networking: Arc<NetworkingManager>,
        base_url: String,
        api_key: Option<String>,
    ) -> Self {
        Self {
            networking,
            base_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ResolveError> {
        let key = self.api_key.as_deref().ok_or_else(|| ResolveError::Configuration {
            provider: ProviderKind::CurseForge,
            reason: "CURSEFORGE_API_KEY is not set".to_string(),
        })?;

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(key).map_err(|e| ResolveError::Configuration {
            provider: ProviderKind::CurseForge,
            reason: format!("API key is not a valid header value: {}", e),
        })?;
        headers.insert("x-api-key", value);
        Ok(headers)
    }

    /// Look a project up by numeric id or by slug
    pub async fn get_mod(&self, id: &str) -> Result<CurseMod, ResolveError> {
        let id = id.trim();
        let not_found = || ResolveError::not_found(ProviderKind::CurseForge, id, "no such project");

        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            let key = CacheKey::new(ProviderKind::CurseForge, &[("endpoint", "mod"), ("id", id)]);
            let url = format!("{}/v1/mods/{}", self.base_url, id);
            let response: Option<DataResponse<CurseMod>> =
                fetch_json(&self.networking, &key, &url, self.headers()?).await?;
            return response.map(|r| r.data).ok_or_else(not_found);
        }

        let game_id = MINECRAFT_GAME_ID.to_string();
        let key = CacheKey::new(
            ProviderKind::CurseForge,
            &[("endpoint", "search"), ("gameId", &game_id), ("slug", id)],
        );
        let url = format!(
            "{}/v1/mods/search?gameId={}&slug={}",
            self.base_url,
            MINECRAFT_GAME_ID,
            encode(id)
        );
        let response: Option<DataResponse<Vec<CurseMod>>> =
            fetch_json(&self.networking, &key, &url, self.headers()?).await?;

        // Search is fuzzy; only an exact slug identifies the project
        let mut hits = response.map(|r| r.data).unwrap_or_default();
        match hits.iter().position(|m| m.slug.eq_ignore_ascii_case(id)) {
            Some(index) => Ok(hits.swap_remove(index)),
            None => {
                let near: Vec<&str> = hits.iter().map(|m| m.slug.as_str()).collect();
                if !near.is_empty() {
                    debug!("No exact CurseForge slug match for '{}' (search found {})", id, near.join(", "));
                }
                Err(not_found())
            }
        }
    }

    /// Every file of a project, walking all pages
    pub async fn get_files(&self, mod_id: u64) -> Result<Vec<CurseFile>, ResolveError> {
        let mod_id_text = mod_id.to_string();
        let page_size = PAGE_SIZE.to_string();
        let mut files = Vec::new();

        for page in 0..MAX_PAGES {
            let index = (page * PAGE_SIZE).to_string();
            let key = CacheKey::new(
                ProviderKind::CurseForge,
                &[
                    ("endpoint", "files"),
                    ("id", &mod_id_text),
                    ("index", &index),
                    ("pageSize", &page_size),
                ],
            );
            let url = format!(
                "{}/v1/mods/{}/files?index={}&pageSize={}",
                self.base_url, mod_id, index, PAGE_SIZE
            );

            let response: FilesPage = fetch_json(&self.networking, &key, &url, self.headers()?)
                .await?
                .ok_or_else(|| {
                    ResolveError::not_found(ProviderKind::CurseForge, &mod_id_text, "no files")
                })?;

            let received = response.data.len();
            files.extend(response.data);

            let done = match response.pagination {
                Some(p) => received == 0 || p.index + p.result_count >= p.total_count,
                None => received < PAGE_SIZE,
            };
            if done {
                break;
            }
        }

        debug!("CurseForge reports {} files for mod {}", files.len(), mod_id);
        Ok(files)
    }

    async fn resolve(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        let project = self.get_mod(&query.id).await?;
        let candidates: Vec<ReleaseCandidate> = self
            .get_files(project.id)
            .await?
            .into_iter()
            .map(CurseFile::into_candidate)
            .collect();

        resolve_from_candidates(ProviderKind::CurseForge, &candidates, query)
    }
}

impl VersionProvider for LiveCurseForgeClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::CurseForge
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion> {
        Box::pin(self.resolve(query))
    }

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata> {
        Box::pin(async move { Ok(self.get_mod(id).await?.into_metadata()) })
    }
}

#[cfg(test)]
mod tests {
    include!("curseforge.test.rs");
}
