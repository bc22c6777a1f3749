use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{trace, warn};

use super::NetworkingError;
use crate::primitives::ProviderKind;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backoff strategy for rate limiting
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Initial backoff duration
    pub initial: Duration,
    /// Maximum backoff duration
    pub max: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl BackoffConfig {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt as i32);
        let secs = (self.initial.as_secs_f64() * factor).min(self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Rate-limited HTTP client for one provider
///
/// Bounds in-flight requests with a semaphore and retries throttled (429),
/// server-side (5xx) and transport failures with exponential backoff.
/// `Retry-After` is honoured when the provider sends it.
#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    client: Client,
    provider: ProviderKind,
    backoff_config: BackoffConfig,
    max_retries: u32,
    permits: Arc<Semaphore>,
}

impl RateLimitedClient {
    pub fn new(client: Client, provider: ProviderKind) -> Self {
        Self::with_backoff(client, provider, BackoffConfig::default(), DEFAULT_MAX_RETRIES)
    }

    pub fn with_backoff(
        client: Client,
        provider: ProviderKind,
        backoff_config: BackoffConfig,
        max_retries: u32,
    ) -> Self {
        Self {
            client,
            provider,
            backoff_config,
            max_retries,
            permits: Arc::new(Semaphore::new(provider.max_concurrent_requests())),
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// GET `url` with retries
    ///
    /// Returns the final response for any status other than an exhausted
    /// 429, so callers decide what 404 or a persistent 5xx means.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<Response, NetworkingError> {
        let mut attempt = 0;

        loop {
            let result = {
                let _permit = self.permits.acquire().await?;
                trace!("GET {} ({}, attempt {})", url, self.provider, attempt + 1);
                self.client.get(url).headers(headers.clone()).send().await
            };

            let retries_left = attempt < self.max_retries;

            let delay = match result {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if !retries_left {
                        return Err(NetworkingError::RateLimited {
                            provider: self.provider,
                            retries: self.max_retries,
                        });
                    }
                    self.retry_delay(attempt, response.headers())
                }
                Ok(response) if response.status().is_server_error() && retries_left => {
                    warn!(
                        "{} answered {} for {}, retrying",
                        self.provider,
                        response.status(),
                        url
                    );
                    self.retry_delay(attempt, response.headers())
                }
                Ok(response) => return Ok(response),
                Err(e) if is_transient(&e) && retries_left => {
                    warn!("Request to {} failed ({}), retrying", url, e);
                    self.backoff_config.delay_for(attempt)
                }
                Err(e) => return Err(e.into()),
            };

            warn!(
                "Backing off {:?} before retrying {} (retry {}/{})",
                delay,
                self.provider,
                attempt + 1,
                self.max_retries
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Delay before the next attempt, preferring the provider's `Retry-After`
    fn retry_delay(&self, attempt: u32, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs).min(self.backoff_config.max))
            .unwrap_or_else(|| self.backoff_config.delay_for(attempt))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// One rate-limited client per provider, sharing a connection pool
#[derive(Debug, Clone)]
pub struct RateLimiterManager {
    clients: HashMap<ProviderKind, RateLimitedClient>,
}

impl RateLimiterManager {
    pub fn new(client: Client) -> Self {
        Self::with_backoff(client, BackoffConfig::default(), DEFAULT_MAX_RETRIES)
    }

    pub fn with_backoff(client: Client, backoff_config: BackoffConfig, max_retries: u32) -> Self {
        let clients = ProviderKind::RESOLVABLE
            .iter()
            .chain(std::iter::once(&ProviderKind::Direct))
            .map(|provider| {
                (
                    *provider,
                    RateLimitedClient::with_backoff(
                        client.clone(),
                        *provider,
                        backoff_config.clone(),
                        max_retries,
                    ),
                )
            })
            .collect();

        Self { clients }
    }

    /// Rate-limited client for a provider
    pub fn client_for(&self, provider: ProviderKind) -> Result<&RateLimitedClient, NetworkingError> {
        self.clients
            .get(&provider)
            .ok_or(NetworkingError::UnknownProvider { provider })
    }
}

#[cfg(test)]
mod tests {
    include!("rate_limit.test.rs");
}
