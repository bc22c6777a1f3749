use reqwest::Client;
use reqwest::header::HeaderMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use crate::primitives::{ProviderKind, sha1_hex};

pub mod cache;
pub mod rate_limit;

pub use cache::{CacheKey, CacheMode, CachedResponse, HttpCache};
pub use rate_limit::{BackoffConfig, DEFAULT_MAX_RETRIES, RateLimitedClient, RateLimiterManager};

/// Networking errors for provider API communication and downloads
#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Rate limit exceeded for {provider} after {retries} retries")]
    RateLimited {
        provider: ProviderKind,
        retries: u32,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { status: u16, url: String },

    #[error("No cached response for {key} (cached-only mode)")]
    CacheMiss { key: String },

    #[error("Response cache error: {message}")]
    CacheError { message: String },

    #[error("Invalid JSON response: {source}")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("No rate-limited client for provider {provider}")]
    UnknownProvider { provider: ProviderKind },

    #[error("Task join error: {source}")]
    TaskJoinError {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("Semaphore acquire error: {source}")]
    SemaphoreError {
        #[from]
        source: tokio::sync::AcquireError,
    },
}

impl NetworkingError {
    /// Whether the failure is worth retrying on a later run
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkingError::RequestFailed { .. } | NetworkingError::RateLimited { .. } => true,
            NetworkingError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Networking configuration
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// HTTP client timeout in seconds
    pub timeout_seconds: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    pub backoff: BackoffConfig,
    /// Folder holding recorded API responses
    pub cache_dir: PathBuf,
    pub cache_mode: CacheMode,
    pub user_agent: String,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: BackoffConfig::default(),
            cache_dir: PathBuf::from("api-responses"),
            cache_mode: CacheMode::Refresh,
            user_agent: format!("modlist/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Networking manager shared by every provider client
///
/// Owns the HTTP connection pool, the per-provider rate limiters and the
/// response cache. All provider traffic goes through [`fetch`], which
/// applies the cache mode.
///
/// [`fetch`]: NetworkingManager::fetch
#[derive(Debug, Clone)]
pub struct NetworkingManager {
    client: Client,
    limiters: RateLimiterManager,
    cache: HttpCache,
    cache_mode: CacheMode,
}

impl NetworkingManager {
    pub fn new(config: NetworkingConfig) -> Result<Self, NetworkingError> {
        trace!("Initializing networking manager");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        let limiters =
            RateLimiterManager::with_backoff(client.clone(), config.backoff, config.max_retries);

        debug!(
            "Networking manager ready (timeout {}s, {} retries, cache {:?} at {})",
            config.timeout_seconds,
            config.max_retries,
            config.cache_mode,
            config.cache_dir.display()
        );

        Ok(Self {
            client,
            limiters,
            cache: HttpCache::new(config.cache_dir),
            cache_mode: config.cache_mode,
        })
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    pub fn cache(&self) -> &HttpCache {
        &self.cache
    }

    /// Get HTTP client for manual requests
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetch a provider response through the cache
    ///
    /// Responses fetched earlier in the same run are reused in every mode;
    /// `Refresh` only skips responses recorded by previous runs.
    ///
    /// A 404 comes back as a [`CachedResponse`] with status 404 rather than
    /// an error; any other non-2xx status is an error and is not recorded.
    pub async fn fetch(
        &self,
        key: &CacheKey,
        url: &str,
        headers: HeaderMap,
    ) -> Result<CachedResponse, NetworkingError> {
        let hit = if self.cache_mode.reads_cache() {
            self.cache.get(key).await
        } else {
            self.cache.get_in_memory(key).await
        };
        if let Some(hit) = hit {
            return Ok(hit);
        }
        if !self.cache_mode.allows_network() {
            return Err(NetworkingError::CacheMiss {
                key: key.to_string(),
            });
        }

        let limiter = self.limiters.client_for(key.provider())?;
        let response = limiter.get(url, headers).await?;
        let status = response.status().as_u16();

        let cached = if status == 404 {
            CachedResponse::not_found()
        } else if response.status().is_success() {
            let body = response.bytes().await?;
            let data = if body.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_slice(&body)?
            };
            CachedResponse { status, data }
        } else {
            return Err(NetworkingError::HttpStatus {
                status,
                url: url.to_string(),
            });
        };

        self.cache.put(key, cached.clone()).await?;
        Ok(cached)
    }

    /// Download `url` to `dest`, replacing it atomically
    ///
    /// When `expected_sha1` is given the body is verified before anything
    /// is written. Returns the number of bytes written.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        expected_sha1: Option<&str>,
    ) -> Result<u64, NetworkingError> {
        let provider = ProviderKind::from_url(url);
        let limiter = self.limiters.client_for(provider)?;
        let response = limiter.get(url, HeaderMap::new()).await?;

        if !response.status().is_success() {
            return Err(NetworkingError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;

        if let Some(expected) = expected_sha1.filter(|s| !s.is_empty()) {
            let actual = sha1_hex(&body);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(NetworkingError::ChecksumMismatch {
                    file: dest.display().to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let dest = dest.to_path_buf();
        let written = body.len() as u64;
        tokio::task::spawn_blocking(move || {
            let dir = match dest.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            cache::write_atomic(&dir, &dest, &body)
        })
        .await??;

        debug!("Downloaded {} ({} bytes)", url, written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
