//! GitHub releases client
//!
//! Records reference repositories as `owner/repo`. Release tags become
//! versions (a leading `v` is dropped) and the artifact is picked from the
//! release assets by name.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{
    ProjectMetadata, ReleaseCandidate, ResolveError, ResolveFuture, ResolvedVersion,
    VersionProvider, VersionQuery, encode, fetch_json, resolve_from_candidates,
};
use crate::modlist::versions::{highest_version, is_release_version};
use crate::networking::{CacheKey, NetworkingManager};
use crate::primitives::{ModType, ProviderKind};

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn version(&self) -> &str {
        strip_tag(&self.tag_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_wiki: bool,
}

impl Repository {
    fn into_metadata(self) -> ProjectMetadata {
        ProjectMetadata {
            id: self.full_name,
            title: self.name.clone(),
            description: self.description.unwrap_or_default(),
            category: self.topics.join(","),
            issues_url: if self.has_issues {
                format!("{}/issues", self.html_url)
            } else {
                String::new()
            },
            wiki_url: if self.has_wiki {
                format!("{}/wiki", self.html_url)
            } else {
                String::new()
            },
            source_url: self.html_url.clone(),
            url: self.html_url,
            mod_type: Some(ModType::from_repo_name(&self.name)),
            name: self.name,
            ..ProjectMetadata::default()
        }
    }
}

/// Tag without its `v` prefix
pub fn strip_tag(tag: &str) -> &str {
    let tag = tag.trim();
    match tag.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => tag,
    }
}

/// Game version encoded in an asset name `*-<version>-<gameversion>.<ext>`
pub fn asset_game_version(name: &str, version: &str, extension: &str) -> Option<String> {
    let stem = name.strip_suffix(&format!(".{}", extension))?;
    let (_, after) = stem.rsplit_once(&format!("-{}-", version))?;
    is_release_version(after).then(|| after.to_string())
}

/// Pick the release asset for a version
///
/// In order: `*-<version>-<gameversion>.<ext>`, `*-<version>.<ext>`, any
/// `.<ext>` asset; `.jar` is tried the same way when `ext` finds nothing.
pub fn select_asset<'a>(
    assets: &'a [Asset],
    version: &str,
    game_version: Option<&str>,
    extension: &str,
) -> Option<&'a Asset> {
    let mut extensions = vec![extension];
    if extension != "jar" {
        extensions.push("jar");
    }

    for ext in extensions {
        let suffix = format!(".{}", ext);
        let with_game = game_version.map(|gv| format!("-{}-{}{}", version, gv, suffix));
        let with_version = format!("-{}{}", version, suffix);

        let found = with_game
            .and_then(|pattern| assets.iter().find(|a| a.name.ends_with(&pattern)))
            .or_else(|| assets.iter().find(|a| a.name.ends_with(&with_version)))
            .or_else(|| assets.iter().find(|a| a.name.ends_with(&suffix)));
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Split `owner/repo`
pub fn parse_repo(id: &str) -> Option<(&str, &str)> {
    let (owner, repo) = id.trim().trim_matches('/').split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        None
    } else {
        Some((owner, repo))
    }
}

/// Live GitHub client (production)
pub struct LiveGitHubClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
    token: Option<String>,
}

impl LiveGitHubClient {
    pub fn new(networking: Arc<NetworkingManager>, token: Option<String>) -> Self {
        Self::with_base_url(networking, ProviderKind::GitHub.api_base_url().to_string(), token)
    }

    /// Create client with custom base URL (for GitHub Enterprise/testing)
    pub fn with_base_url(
        networking: Arc<NetworkingManager>,
        base_url: String,
        token: Option<String>,
    ) -> Self {
        Self {
            networking,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(value) = self
            .token
            .as_deref()
            .and_then(|token| HeaderValue::from_str(&format!("Bearer {}", token)).ok())
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn repo<'a>(&self, id: &'a str) -> Result<(&'a str, &'a str), ResolveError> {
        parse_repo(id).ok_or_else(|| {
            ResolveError::not_found(ProviderKind::GitHub, id, "expected owner/repo")
        })
    }

    pub async fn get_repository(&self, id: &str) -> Result<Repository, ResolveError> {
        let (owner, repo) = self.repo(id)?;
        let key = CacheKey::new(ProviderKind::GitHub, &[("endpoint", "repo"), ("id", id)]);
        let url = format!("{}/repos/{}/{}", self.base_url, encode(owner), encode(repo));

        fetch_json(&self.networking, &key, &url, self.headers())
            .await?
            .ok_or_else(|| ResolveError::not_found(ProviderKind::GitHub, id, "no such repository"))
    }

    pub async fn get_releases(&self, id: &str) -> Result<Vec<Release>, ResolveError> {
        let (owner, repo) = self.repo(id)?;
        let key = CacheKey::new(ProviderKind::GitHub, &[("endpoint", "releases"), ("id", id)]);
        let url = format!(
            "{}/repos/{}/{}/releases?per_page=100",
            self.base_url,
            encode(owner),
            encode(repo)
        );

        fetch_json(&self.networking, &key, &url, self.headers())
            .await?
            .ok_or_else(|| ResolveError::not_found(ProviderKind::GitHub, id, "no such repository"))
    }

    async fn resolve(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        let releases = self.get_releases(&query.id).await?;
        let extension = query.mod_type.artifact_extension();

        let candidates: Vec<ReleaseCandidate> = releases
            .iter()
            .filter(|release| !release.draft)
            .filter_map(|release| release_candidate(release, query, extension))
            .collect();
        debug!(
            "GitHub reports {} usable releases for {}",
            candidates.len(),
            query.id
        );

        resolve_from_candidates(ProviderKind::GitHub, &candidates, query)
    }
}

fn release_candidate(
    release: &Release,
    query: &VersionQuery,
    extension: &str,
) -> Option<ReleaseCandidate> {
    let version = release.version();
    let game_versions: Vec<String> = release
        .assets
        .iter()
        .filter_map(|asset| {
            asset_game_version(&asset.name, version, extension)
                .or_else(|| asset_game_version(&asset.name, version, "jar"))
        })
        .collect();

    let target = query
        .game_version
        .clone()
        .or_else(|| highest_version(game_versions.iter().map(String::as_str)));
    let asset = select_asset(&release.assets, version, target.as_deref(), extension)?;

    Some(ReleaseCandidate {
        version: version.to_string(),
        download_url: asset.browser_download_url.clone(),
        file_name: asset.name.clone(),
        game_versions,
        loaders: Vec::new(),
        prerelease: release.prerelease,
        published: release.published_at.clone().unwrap_or_default(),
        dependencies: Vec::new(),
        sha1: None,
    })
}

impl VersionProvider for LiveGitHubClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion> {
        Box::pin(self.resolve(query))
    }

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata> {
        Box::pin(async move { Ok(self.get_repository(id).await?.into_metadata()) })
    }
}

#[cfg(test)]
mod tests {
    include!("github.test.rs");
}
