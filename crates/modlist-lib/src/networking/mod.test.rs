use super::*;
use mockito::Server;
use serde_json::json;
use tempfile::TempDir;

fn manager(cache_dir: &Path, cache_mode: CacheMode) -> NetworkingManager {
    NetworkingManager::new(NetworkingConfig {
        timeout_seconds: 5,
        max_retries: 1,
        backoff: BackoffConfig {
            initial: Duration::from_millis(5),
            max: Duration::from_millis(10),
            multiplier: 2.0,
        },
        cache_dir: cache_dir.to_path_buf(),
        cache_mode,
        ..NetworkingConfig::default()
    })
    .unwrap()
}

fn key(id: &str) -> CacheKey {
    CacheKey::new(ProviderKind::Modrinth, &[("endpoint", "project"), ("id", id)])
}

#[test]
fn test_default_config() {
    let config = NetworkingConfig::default();
    assert_eq!(config.timeout_seconds, 30);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.cache_mode, CacheMode::Refresh);
    assert!(config.user_agent.starts_with("modlist/"));
}

#[tokio::test]
async fn test_refresh_fetches_and_records() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/project/sodium")
        .with_status(200)
        .with_body(r#"{"slug":"sodium"}"#)
        .expect(2)
        .create_async()
        .await;

    let net = manager(temp_dir.path(), CacheMode::Refresh);
    let url = format!("{}/project/sodium", server.url());

    let first = net.fetch(&key("sodium"), &url, HeaderMap::new()).await.unwrap();
    assert_eq!(first.data, json!({"slug": "sodium"}));
    assert!(net.cache().path_for(&key("sodium")).exists());

    // Same run: served from memory
    let again = net.fetch(&key("sodium"), &url, HeaderMap::new()).await.unwrap();
    assert_eq!(again, first);

    // A new run ignores the recording and asks the provider again
    let next_run = manager(temp_dir.path(), CacheMode::Refresh);
    next_run.fetch(&key("sodium"), &url, HeaderMap::new()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_read_through_serves_recorded_response() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/project/lithium")
        .with_status(200)
        .with_body(r#"{"slug":"lithium"}"#)
        .expect(1)
        .create_async()
        .await;

    let net = manager(temp_dir.path(), CacheMode::ReadThrough);
    let url = format!("{}/project/lithium", server.url());

    net.fetch(&key("lithium"), &url, HeaderMap::new()).await.unwrap();
    let second = net.fetch(&key("lithium"), &url, HeaderMap::new()).await.unwrap();

    assert_eq!(second.data, json!({"slug": "lithium"}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cached_only_replays_without_network() {
    let temp_dir = TempDir::new().unwrap();
    let recorder = HttpCache::new(temp_dir.path().to_path_buf());
    recorder
        .put(&key("iris"), CachedResponse::ok(json!({"slug": "iris"})))
        .await
        .unwrap();

    let net = manager(temp_dir.path(), CacheMode::CachedOnly);
    let hit = net
        .fetch(&key("iris"), "http://127.0.0.1:9/unreachable", HeaderMap::new())
        .await
        .unwrap();
    assert_eq!(hit.data, json!({"slug": "iris"}));
}

#[tokio::test]
async fn test_cached_only_miss_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let net = manager(temp_dir.path(), CacheMode::CachedOnly);

    let err = net
        .fetch(&key("absent"), "http://127.0.0.1:9/unreachable", HeaderMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkingError::CacheMiss { .. }));
}

#[tokio::test]
async fn test_not_found_is_recorded_and_replayed() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/gone")
        .with_status(404)
        .create_async()
        .await;

    let url = format!("{}/project/gone", server.url());
    let live = manager(temp_dir.path(), CacheMode::Refresh);
    assert!(live.fetch(&key("gone"), &url, HeaderMap::new()).await.unwrap().is_not_found());

    let replay = manager(temp_dir.path(), CacheMode::CachedOnly);
    assert!(
        replay
            .fetch(&key("gone"), &url, HeaderMap::new())
            .await
            .unwrap()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_server_error_is_not_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/broken")
        .with_status(500)
        .create_async()
        .await;

    let net = manager(temp_dir.path(), CacheMode::Refresh);
    let url = format!("{}/project/broken", server.url());
    let err = net.fetch(&key("broken"), &url, HeaderMap::new()).await.unwrap_err();

    assert!(matches!(err, NetworkingError::HttpStatus { status: 500, .. }));
    assert!(err.is_transient());
    assert!(!net.cache().path_for(&key("broken")).exists());
}

#[tokio::test]
async fn test_download_writes_file_and_verifies_checksum() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/mod.jar")
        .with_status(200)
        .with_body("abc")
        .create_async()
        .await;

    let net = manager(temp_dir.path(), CacheMode::Refresh);
    let url = format!("{}/files/mod.jar", server.url());
    let dest = temp_dir.path().join("1.21.5").join("mods").join("mod.jar");

    let written = net
        .download(&url, &dest, Some("a9993e364706816aba3e25717850c26c9cd0d89d"))
        .await
        .unwrap();
    assert_eq!(written, 3);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "abc");
}

#[tokio::test]
async fn test_download_checksum_mismatch_leaves_no_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/bad.jar")
        .with_status(200)
        .with_body("tampered")
        .create_async()
        .await;

    let net = manager(temp_dir.path(), CacheMode::Refresh);
    let url = format!("{}/files/bad.jar", server.url());
    let dest = temp_dir.path().join("bad.jar");

    let err = net.download(&url, &dest, Some("0000")).await.unwrap_err();
    assert!(matches!(err, NetworkingError::ChecksumMismatch { .. }));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_http_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/missing.jar")
        .with_status(404)
        .create_async()
        .await;

    let net = manager(temp_dir.path(), CacheMode::Refresh);
    let url = format!("{}/files/missing.jar", server.url());
    let err = net
        .download(&url, &temp_dir.path().join("missing.jar"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, NetworkingError::HttpStatus { status: 404, .. }));
    assert!(!err.is_transient());
}
