use super::*;
use mockito::Server;

fn fast_backoff() -> BackoffConfig {
    BackoffConfig {
        initial: Duration::from_millis(5),
        max: Duration::from_millis(20),
        multiplier: 2.0,
    }
}

#[test]
fn test_backoff_config_default() {
    let config = BackoffConfig::default();
    assert_eq!(config.initial, Duration::from_secs(1));
    assert_eq!(config.max, Duration::from_secs(60));
    assert_eq!(config.multiplier, 2.0);
}

#[test]
fn test_backoff_grows_exponentially_and_caps() {
    let config = BackoffConfig {
        initial: Duration::from_millis(100),
        max: Duration::from_millis(500),
        multiplier: 2.0,
    };
    assert_eq!(config.delay_for(0), Duration::from_millis(100));
    assert_eq!(config.delay_for(1), Duration::from_millis(200));
    assert_eq!(config.delay_for(2), Duration::from_millis(400));
    assert_eq!(config.delay_for(3), Duration::from_millis(500));
    assert_eq!(config.delay_for(10), Duration::from_millis(500));
}

#[test]
fn test_retry_after_header_is_preferred() {
    let rate_limited = RateLimitedClient::with_backoff(
        Client::new(),
        ProviderKind::Modrinth,
        BackoffConfig::default(),
        3,
    );
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, "2".parse().unwrap());
    assert_eq!(rate_limited.retry_delay(0, &headers), Duration::from_secs(2));

    headers.insert(RETRY_AFTER, "3600".parse().unwrap());
    assert_eq!(rate_limited.retry_delay(0, &headers), Duration::from_secs(60));

    assert_eq!(
        rate_limited.retry_delay(1, &HeaderMap::new()),
        Duration::from_secs(2)
    );
}

#[tokio::test]
async fn test_successful_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/project/sodium")
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let rate_limited = RateLimitedClient::new(Client::new(), ProviderKind::Modrinth);
    let url = format!("{}/project/sodium", server.url());
    let response = rate_limited.get(&url, HeaderMap::new()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let rate_limited =
        RateLimitedClient::with_backoff(Client::new(), ProviderKind::Modrinth, fast_backoff(), 3);
    let url = format!("{}/missing", server.url());
    let response = rate_limited.get(&url, HeaderMap::new()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_retried_then_returned() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/flaky")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let rate_limited =
        RateLimitedClient::with_backoff(Client::new(), ProviderKind::GitHub, fast_backoff(), 2);
    let url = format!("{}/flaky", server.url());
    let response = rate_limited.get(&url, HeaderMap::new()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_exhaustion_is_an_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/throttled")
        .with_status(429)
        .expect(2)
        .create_async()
        .await;

    let rate_limited =
        RateLimitedClient::with_backoff(Client::new(), ProviderKind::CurseForge, fast_backoff(), 1);
    let url = format!("{}/throttled", server.url());
    let result = rate_limited.get(&url, HeaderMap::new()).await;

    match result {
        Err(NetworkingError::RateLimited { provider, retries }) => {
            assert_eq!(provider, ProviderKind::CurseForge);
            assert_eq!(retries, 1);
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_recovers_after_rate_limit() {
    let mut server = Server::new_async().await;
    let throttled = server
        .mock("GET", "/recover")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/recover")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let rate_limited =
        RateLimitedClient::with_backoff(Client::new(), ProviderKind::Modrinth, fast_backoff(), 3);
    let url = format!("{}/recover", server.url());
    let response = rate_limited.get(&url, HeaderMap::new()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    throttled.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_headers_are_forwarded() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/mods/1")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let rate_limited = RateLimitedClient::new(Client::new(), ProviderKind::CurseForge);
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", "secret".parse().unwrap());
    let url = format!("{}/v1/mods/1", server.url());
    let response = rate_limited.get(&url, headers).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[test]
fn test_manager_has_client_per_provider() {
    let manager = RateLimiterManager::new(Client::new());
    for provider in ProviderKind::RESOLVABLE {
        assert_eq!(manager.client_for(provider).unwrap().provider(), provider);
    }
    assert!(manager.client_for(ProviderKind::Direct).is_ok());
}
