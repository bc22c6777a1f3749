//! Fabric Meta client
//!
//! Resolves the two infrastructure rows Fabric servers need: the installer
//! jar and the server launcher jar for a game/loader/installer triple.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{
    ProjectMetadata, ResolveError, ResolveFuture, ResolvedVersion, VersionProvider, VersionQuery,
    encode, fetch_json,
};
use crate::modlist::versions::{compare_versions, sort_versions};
use crate::networking::{CacheKey, NetworkingManager};
use crate::primitives::{ModType, ProviderKind};

#[derive(Debug, Clone, Deserialize)]
pub struct InstallerVersion {
    pub version: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub stable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoaderVersion {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameVersion {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
}

/// Newest stable entry by version order
fn newest_stable<'a, T>(
    entries: &'a [T],
    version: impl Fn(&T) -> &str,
    stable: impl Fn(&T) -> bool,
) -> Option<&'a T> {
    entries
        .iter()
        .filter(|entry| stable(*entry))
        .max_by(|a, b| compare_versions(version(*a), version(*b)))
}

/// Live Fabric Meta client (production)
pub struct LiveFabricClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
}

impl LiveFabricClient {
    pub fn new(networking: Arc<NetworkingManager>) -> Self {
        Self::with_base_url(networking, ProviderKind::Fabric.api_base_url().to_string())
    }

    /// Create client with custom base URL (for testing)
    pub fn with_base_url(networking: Arc<NetworkingManager>, base_url: String) -> Self {
        Self {
            networking,
            base_url,
        }
    }

    async fn list<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, ResolveError> {
        let key = CacheKey::new(ProviderKind::Fabric, &[("endpoint", endpoint)]);
        let url = format!("{}/v2/versions/{}", self.base_url, endpoint);

        Ok(fetch_json(&self.networking, &key, &url, HeaderMap::new())
            .await?
            .unwrap_or_default())
    }

    pub async fn installers(&self) -> Result<Vec<InstallerVersion>, ResolveError> {
        self.list("installer").await
    }

    pub async fn loaders(&self) -> Result<Vec<LoaderVersion>, ResolveError> {
        self.list("loader").await
    }

    pub async fn game_versions(&self) -> Result<Vec<GameVersion>, ResolveError> {
        self.list("game").await
    }

    /// Server launcher URL for a game/loader/installer triple
    pub fn launcher_url(&self, game: &str, loader: &str, installer: &str) -> String {
        format!(
            "{}/v2/versions/loader/{}/{}/{}/server/jar",
            self.base_url,
            encode(game),
            encode(loader),
            encode(installer)
        )
    }

    async fn newest_installer(&self, query: &VersionQuery) -> Result<InstallerVersion, ResolveError> {
        let installers = self.installers().await?;
        let picked = match query.pinned_version() {
            Some(pinned) => installers.iter().find(|i| i.version == pinned),
            None => newest_stable(&installers, |i| i.version.as_str(), |i| i.stable),
        };
        picked
            .cloned()
            .ok_or_else(|| ResolveError::not_found(ProviderKind::Fabric, &query.id, "no installer release"))
    }

    async fn resolve_installer(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        let installer = self.newest_installer(query).await?;
        let stable_games = self.stable_game_versions().await?;

        Ok(ResolvedVersion {
            jar_filename: format!("fabric-installer-{}.jar", installer.version),
            download_url: installer.url,
            version: installer.version,
            game_version: query.game_version.clone().unwrap_or_default(),
            dependencies: Vec::new(),
            available_game_versions: stable_games,
            sha1: None,
        })
    }

    async fn resolve_launcher(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        let stable_games = self.stable_game_versions().await?;

        let game = match &query.game_version {
            Some(gv) if stable_games.contains(gv) => gv.clone(),
            Some(gv) => {
                return Err(ResolveError::not_found(
                    ProviderKind::Fabric,
                    &query.id,
                    format!("game version {} is not supported", gv),
                ));
            }
            None => stable_games
                .iter()
                .rev()
                .find(|gv| {
                    query
                        .game_version_ceiling
                        .as_deref()
                        .is_none_or(|ceiling| compare_versions(gv, ceiling) != Ordering::Greater)
                })
                .cloned()
                .ok_or_else(|| {
                    ResolveError::not_found(ProviderKind::Fabric, &query.id, "no stable game version")
                })?,
        };

        let loaders = self.loaders().await?;
        let loader = match query.pinned_version() {
            Some(pinned) => loaders.iter().find(|l| l.version == pinned),
            None => newest_stable(&loaders, |l| l.version.as_str(), |l| l.stable),
        }
        .cloned()
        .ok_or_else(|| ResolveError::not_found(ProviderKind::Fabric, &query.id, "no loader release"))?;

        // The launcher follows the installer, never the pinned loader version
        let installer_query = VersionQuery {
            version: None,
            ..query.clone()
        };
        let installer = self.newest_installer(&installer_query).await?;

        Ok(ResolvedVersion {
            download_url: self.launcher_url(&game, &loader.version, &installer.version),
            jar_filename: format!(
                "fabric-server-mc.{}-loader.{}-launcher.{}.jar",
                game, loader.version, installer.version
            ),
            version: loader.version,
            game_version: game,
            dependencies: Vec::new(),
            available_game_versions: stable_games,
            sha1: None,
        })
    }

    async fn stable_game_versions(&self) -> Result<Vec<String>, ResolveError> {
        Ok(sort_versions(
            self.game_versions()
                .await?
                .into_iter()
                .filter(|gv| gv.stable)
                .map(|gv| gv.version)
                .collect(),
        ))
    }

    async fn resolve(&self, query: &VersionQuery) -> Result<ResolvedVersion, ResolveError> {
        match query.mod_type {
            ModType::Installer => self.resolve_installer(query).await,
            ModType::Launcher => self.resolve_launcher(query).await,
            other => Err(ResolveError::not_found(
                ProviderKind::Fabric,
                &query.id,
                format!("Fabric Meta does not host {} rows", other),
            )),
        }
    }
}

impl VersionProvider for LiveFabricClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Fabric
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion> {
        Box::pin(self.resolve(query))
    }

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata> {
        Box::pin(async move {
            let installer = id.to_lowercase().contains("installer");
            Ok(ProjectMetadata {
                id: id.to_string(),
                name: if installer {
                    "Fabric Installer".to_string()
                } else {
                    "Fabric Server Launcher".to_string()
                },
                title: "Fabric".to_string(),
                description: "Fabric mod loader".to_string(),
                source_url: "https://github.com/FabricMC".to_string(),
                url: "https://fabricmc.net/use/server/".to_string(),
                mod_type: Some(if installer {
                    ModType::Installer
                } else {
                    ModType::Launcher
                }),
                ..ProjectMetadata::default()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    include!("fabric.test.rs");
}
