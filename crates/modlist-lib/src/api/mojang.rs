//! Mojang version manifest client
//!
//! Resolves the official server jar of a game version. The manifest lists
//! every version with a link to its own JSON document, which carries the
//! server download.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{
    ProjectMetadata, ResolveError, ResolveFuture, ResolvedVersion, VersionProvider, VersionQuery,
    fetch_json,
};
use crate::modlist::versions::{compare_versions, highest_version, sort_versions};
use crate::networking::{CacheKey, NetworkingManager};
use crate::primitives::{ModType, ProviderKind};

pub const MANIFEST_PATH: &str = "/mc/game/version_manifest_v2.json";

#[derive(Debug, Clone, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    #[serde(default)]
    pub snapshot: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<ManifestEntry>,
}

impl VersionManifest {
    /// Release ids, ascending
    pub fn releases(&self) -> Vec<String> {
        sort_versions(
            self.versions
                .iter()
                .filter(|entry| entry.kind == "release")
                .map(|entry| entry.id.clone())
                .collect(),
        )
    }

    pub fn entry(&self, id: &str) -> Option<&ManifestEntry> {
        self.versions.iter().find(|entry| entry.id == id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Download {
    pub url: String,
    pub sha1: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Downloads {
    pub server: Option<Download>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionDetails {
    #[serde(default)]
    pub downloads: Downloads,
}

/// Live Mojang client (production)
pub struct LiveMojangClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
}

impl LiveMojangClient {
    pub fn new(networking: Arc<NetworkingManager>) -> Self {
        Self::with_base_url(networking, ProviderKind::Mojang.api_base_url().to_string())
    }

    /// Create client with custom base URL (for testing)
    pub fn with_base_url(networking: Arc<NetworkingManager>, base_url: String) -> Self {
        Self {
            networking,
            base_url,
        }
    }

    pub async fn get_manifest(&self) -> Result<VersionManifest, ResolveError> {
        let key = CacheKey::new(ProviderKind::Mojang, &[("endpoint", "manifest")]);
        let url = format!("{}{}", self.base_url, MANIFEST_PATH);

        fetch_json(&self.networking, &key, &url, HeaderMap::new())
            .await?
            .ok_or_else(|| ResolveError::InvalidResponse {
                provider: ProviderKind::Mojang,
                message: "version manifest is missing".to_string(),
            })
    }

    async fn get_details(&self, entry: &ManifestEntry) -> Result<VersionDetails, ResolveError> {
        let key = CacheKey::new(ProviderKind::Mojang, &[("endpoint", "version"), ("id", &entry.id)]);

        fetch_json(&self.networking, &key, &entry.url, HeaderMap::new())
            .await?
            .ok_or_else(|| ResolveError::not_found(ProviderKind::Mojang, &entry.id, "no version document"))
    }

    async fn resolve(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        let manifest = self.get_manifest().await?;
        let releases = manifest.releases();

        let target = match (query.pinned_version(), &query.game_version) {
            (Some(pinned), _) => pinned.to_string(),
            (None, Some(gv)) => gv.clone(),
            (None, None) => match &query.game_version_ceiling {
                Some(ceiling) => highest_version(
                    releases
                        .iter()
                        .map(String::as_str)
                        .filter(|r| compare_versions(r, ceiling) != Ordering::Greater),
                )
                .ok_or_else(|| {
                    ResolveError::not_found(ProviderKind::Mojang, &query.id, "no release below the ceiling")
                })?,
                None => manifest.latest.release.clone(),
            },
        };

        let entry = manifest.entry(&target).ok_or_else(|| {
            ResolveError::not_found(
                ProviderKind::Mojang,
                &query.id,
                format!("game version {} is not in the manifest", target),
            )
        })?;

        let server = self.get_details(entry).await?.downloads.server.ok_or_else(|| {
            ResolveError::not_found(
                ProviderKind::Mojang,
                &query.id,
                format!("game version {} has no server download", target),
            )
        })?;

        Ok(ResolvedVersion {
            version: target.clone(),
            download_url: server.url,
            jar_filename: format!("minecraft_server.{}.jar", target),
            game_version: target,
            dependencies: Vec::new(),
            available_game_versions: releases,
            sha1: server.sha1,
        })
    }
}

impl VersionProvider for LiveMojangClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Mojang
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion> {
        Box::pin(self.resolve(query))
    }

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata> {
        Box::pin(async move {
            Ok(ProjectMetadata {
                id: id.to_string(),
                name: "Minecraft Server".to_string(),
                title: "Minecraft: Java Edition Server".to_string(),
                description: "Official dedicated server".to_string(),
                server_side: "required".to_string(),
                url: "https://www.minecraft.net/en-us/download/server".to_string(),
                mod_type: Some(ModType::Server),
                ..ProjectMetadata::default()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    include!("mojang.test.rs");
}
