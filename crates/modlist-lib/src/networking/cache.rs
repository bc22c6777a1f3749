//! On-disk API response cache
//!
//! Every provider request is identified by a [`CacheKey`] built from the
//! provider and its request parameters. Responses are stored one JSON file
//! per key so a run can later be replayed without network access
//! (`--cached-only`). Only successful (2xx) and not-found (404) responses
//! are recorded; a cached 404 replays as "not found".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use super::NetworkingError;
use crate::primitives::{ProviderKind, sha256_hex};

/// How the response cache participates in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Ask the provider once per run, record what it says
    #[default]
    Refresh,
    /// Serve recorded responses, ask the provider on a miss
    ReadThrough,
    /// Never touch the network; a miss is an error
    CachedOnly,
}

impl CacheMode {
    /// Resolve the mode from the two command-line switches
    ///
    /// `--cached-only` implies `--use-cached-responses`.
    pub fn from_flags(use_cached_responses: bool, cached_only: bool) -> Self {
        match (use_cached_responses, cached_only) {
            (_, true) => CacheMode::CachedOnly,
            (true, false) => CacheMode::ReadThrough,
            (false, false) => CacheMode::Refresh,
        }
    }

    pub fn reads_cache(&self) -> bool {
        !matches!(self, CacheMode::Refresh)
    }

    pub fn allows_network(&self) -> bool {
        !matches!(self, CacheMode::CachedOnly)
    }
}

/// Deterministic identity of a provider request
///
/// Parameters are sorted by name, so the same logical request always maps
/// to the same key regardless of how the caller ordered them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    provider: ProviderKind,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(provider: ProviderKind, params: &[(&str, &str)]) -> Self {
        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        params.sort();
        Self { provider, params }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Canonical textual form, e.g. `modrinth?endpoint=project&id=sodium`
    pub fn canonical(&self) -> String {
        let query = self
            .params
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.provider, query)
    }

    /// File name of the recorded response inside the cache folder
    ///
    /// A readable slug of the parameter values followed by a digest of the
    /// canonical form, so distinct keys never collide on disk.
    pub fn file_name(&self) -> String {
        let slug: String = self
            .params
            .iter()
            .map(|(_, value)| value.as_str())
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .take(60)
            .collect();
        let digest = sha256_hex(self.canonical().as_bytes());
        format!("{}-{}-{}.json", self.provider, slug, &digest[..16])
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// A recorded provider response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status the provider answered with
    pub status: u16,
    /// Parsed JSON body (`null` for 404)
    pub data: serde_json::Value,
}

impl CachedResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self { status: 200, data }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            data: serde_json::Value::Null,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Whether a response with this status may be recorded
    pub fn is_cacheable_status(status: u16) -> bool {
        (200..300).contains(&status) || status == 404
    }
}

/// Response cache with an in-memory layer over one-file-per-key storage
#[derive(Debug, Clone)]
pub struct HttpCache {
    memory: Arc<RwLock<HashMap<CacheKey, CachedResponse>>>,
    cache_dir: PathBuf,
}

impl HttpCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            memory: Arc::new(RwLock::new(HashMap::new())),
            cache_dir,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    /// Response recorded earlier in this run, without touching the disk
    pub async fn get_in_memory(&self, key: &CacheKey) -> Option<CachedResponse> {
        let hit = self.memory.read().await.get(key).cloned();
        if hit.is_some() {
            trace!("Cache hit (memory) for {}", key);
        }
        hit
    }

    /// Look a key up in memory, then on disk
    ///
    /// Unreadable or corrupt files are treated as misses.
    pub async fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        if let Some(hit) = self.get_in_memory(key).await {
            return Some(hit);
        }

        let path = self.path_for(key);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read cached response {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<CachedResponse>(&data) {
            Ok(response) => {
                trace!("Cache hit (disk) for {}", key);
                self.memory
                    .write()
                    .await
                    .insert(key.clone(), response.clone());
                Some(response)
            }
            Err(e) => {
                warn!("Ignoring corrupt cached response {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Record a response, replacing any previous one for the same key
    ///
    /// Responses with a non-cacheable status are ignored.
    pub async fn put(&self, key: &CacheKey, response: CachedResponse) -> Result<(), NetworkingError> {
        if !CachedResponse::is_cacheable_status(response.status) {
            debug!(
                "Not caching response with status {} for {}",
                response.status, key
            );
            return Ok(());
        }

        let path = self.path_for(key);
        let body = serde_json::to_vec_pretty(&response)?;
        let cache_dir = self.cache_dir.clone();

        tokio::task::spawn_blocking(move || write_atomic(&cache_dir, &path, &body))
            .await?
            .map_err(|e| NetworkingError::CacheError {
                message: format!("Failed to write cached response: {}", e),
            })?;

        self.memory.write().await.insert(key.clone(), response);
        trace!("Cached response for {}", key);
        Ok(())
    }

    /// Forget every recorded response, in memory and on disk
    ///
    /// Only `*.json` files directly inside the cache folder are removed.
    /// Returns the number of files deleted.
    pub async fn clear(&self) -> Result<usize, NetworkingError> {
        self.memory.write().await.clear();

        let mut entries = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        debug!("Cleared {} cached responses", removed);
        Ok(removed)
    }

    /// Number of responses held in memory
    pub async fn len(&self) -> usize {
        self.memory.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.memory.read().await.is_empty()
    }
}

/// Write through a temporary file in the target directory, then rename
pub(crate) fn write_atomic(dir: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("cache.test.rs");
}
