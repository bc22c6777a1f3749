// Tests for Mojang version manifest client

use super::*;
use crate::networking::{CacheMode, NetworkingConfig};
use crate::primitives::Loader;
use mockito::{Server, ServerGuard};
use serde_json::json;
use tempfile::TempDir;

fn networking(cache_dir: &std::path::Path) -> Arc<NetworkingManager> {
    Arc::new(
        NetworkingManager::new(NetworkingConfig {
            timeout_seconds: 5,
            max_retries: 0,
            cache_dir: cache_dir.to_path_buf(),
            cache_mode: CacheMode::Refresh,
            ..NetworkingConfig::default()
        })
        .unwrap(),
    )
}

async fn manifest_server() -> ServerGuard {
    let mut server = Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", MANIFEST_PATH)
        .with_status(200)
        .with_body(
            json!({
                "latest": {"release": "1.21.6", "snapshot": "25w30a"},
                "versions": [
                    {"id": "25w30a", "type": "snapshot", "url": format!("{base}/v1/packages/s/25w30a.json")},
                    {"id": "1.21.6", "type": "release", "url": format!("{base}/v1/packages/a/1.21.6.json")},
                    {"id": "1.21.5", "type": "release", "url": format!("{base}/v1/packages/b/1.21.5.json")},
                    {"id": "1.21.4", "type": "release", "url": format!("{base}/v1/packages/c/1.21.4.json")}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    for (hash, id) in [("a", "1.21.6"), ("b", "1.21.5")] {
        server
            .mock("GET", format!("/v1/packages/{hash}/{id}.json").as_str())
            .with_status(200)
            .with_body(
                json!({
                    "downloads": {
                        "client": {"url": "https://piston-data.mojang.com/client.jar", "sha1": "c"},
                        "server": {"url": format!("https://piston-data.mojang.com/v1/objects/{hash}/server.jar"), "sha1": hash}
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
    }
    server
        .mock("GET", "/v1/packages/c/1.21.4.json")
        .with_status(200)
        .with_body(r#"{"downloads": {"client": {"url": "https://x/client.jar"}}}"#)
        .create_async()
        .await;

    server
}

fn server_query(game_version: Option<&str>) -> VersionQuery {
    VersionQuery::new("minecraft", Loader::Vanilla, ModType::Server).with_game_version(game_version)
}

#[tokio::test]
async fn test_resolve_requested_game_version() {
    let temp_dir = TempDir::new().unwrap();
    let server = manifest_server().await;
    let client = LiveMojangClient::with_base_url(networking(temp_dir.path()), server.url());

    let resolved = client.resolve_version(&server_query(Some("1.21.5"))).await.unwrap();
    assert_eq!(resolved.version, "1.21.5");
    assert_eq!(resolved.game_version, "1.21.5");
    assert_eq!(resolved.jar_filename, "minecraft_server.1.21.5.jar");
    assert_eq!(resolved.download_url, "https://piston-data.mojang.com/v1/objects/b/server.jar");
    assert_eq!(resolved.sha1.as_deref(), Some("b"));
    assert_eq!(resolved.available_game_versions, vec!["1.21.4", "1.21.5", "1.21.6"]);
}

#[tokio::test]
async fn test_defaults_to_latest_release() {
    let temp_dir = TempDir::new().unwrap();
    let server = manifest_server().await;
    let client = LiveMojangClient::with_base_url(networking(temp_dir.path()), server.url());

    let resolved = client.resolve_version(&server_query(None)).await.unwrap();
    assert_eq!(resolved.version, "1.21.6");

    let capped = server_query(None).with_ceiling(Some("1.21.5"));
    assert_eq!(client.resolve_version(&capped).await.unwrap().version, "1.21.5");
}

#[tokio::test]
async fn test_unknown_or_serverless_versions_are_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let server = manifest_server().await;
    let client = LiveMojangClient::with_base_url(networking(temp_dir.path()), server.url());

    assert!(client
        .resolve_version(&server_query(Some("1.21.7")))
        .await
        .unwrap_err()
        .is_not_found());
    assert!(client
        .resolve_version(&server_query(Some("1.21.4")))
        .await
        .unwrap_err()
        .is_not_found());
}
