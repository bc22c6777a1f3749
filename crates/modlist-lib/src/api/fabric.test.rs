// Tests for Fabric Meta client

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

async fn meta_server() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v2/versions/installer")
        .with_status(200)
        .with_body(
            json!([
                {"version": "1.1.0", "url": "https://maven.fabricmc.net/installer-1.1.0.jar", "stable": false},
                {"version": "1.0.3", "url": "https://maven.fabricmc.net/installer-1.0.3.jar", "stable": true},
                {"version": "1.0.1", "url": "https://maven.fabricmc.net/installer-1.0.1.jar", "stable": true}
            ])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v2/versions/loader")
        .with_status(200)
        .with_body(
            json!([
                {"version": "0.17.0", "stable": false},
                {"version": "0.16.14", "stable": true},
                {"version": "0.16.9", "stable": true}
            ])
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v2/versions/game")
        .with_status(200)
        .with_body(
            json!([
                {"version": "25w30a", "stable": false},
                {"version": "1.21.6", "stable": true},
                {"version": "1.21.5", "stable": true}
            ])
            .to_string(),
        )
        .create_async()
        .await;
    server
}

#[tokio::test]
async fn test_installer_resolves_newest_stable() {
    let temp_dir = TempDir::new().unwrap();
    let server = meta_server().await;
    let client = LiveFabricClient::with_base_url(networking(temp_dir.path()), server.url());

    let query = VersionQuery::new("fabric-installer", Loader::Fabric, ModType::Installer);
    let resolved = client.resolve_version(&query).await.unwrap();
    assert_eq!(resolved.version, "1.0.3");
    assert_eq!(resolved.download_url, "https://maven.fabricmc.net/installer-1.0.3.jar");
    assert_eq!(resolved.jar_filename, "fabric-installer-1.0.3.jar");
    assert_eq!(resolved.available_game_versions, vec!["1.21.5", "1.21.6"]);
}

#[tokio::test]
async fn test_launcher_url_for_game_version() {
    let temp_dir = TempDir::new().unwrap();
    let server = meta_server().await;
    let client = LiveFabricClient::with_base_url(networking(temp_dir.path()), server.url());

    let query = VersionQuery::new("fabric-server", Loader::Fabric, ModType::Launcher)
        .with_game_version(Some("1.21.5"));
    let resolved = client.resolve_version(&query).await.unwrap();

    assert_eq!(resolved.version, "0.16.14");
    assert_eq!(resolved.game_version, "1.21.5");
    assert_eq!(
        resolved.download_url,
        format!("{}/v2/versions/loader/1.21.5/0.16.14/1.0.3/server/jar", server.url())
    );
    assert_eq!(
        resolved.jar_filename,
        "fabric-server-mc.1.21.5-loader.0.16.14-launcher.1.0.3.jar"
    );
}

#[tokio::test]
async fn test_launcher_unknown_game_version_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let server = meta_server().await;
    let client = LiveFabricClient::with_base_url(networking(temp_dir.path()), server.url());

    let query = VersionQuery::new("fabric-server", Loader::Fabric, ModType::Launcher)
        .with_game_version(Some("1.21.7"));
    assert!(client.resolve_version(&query).await.unwrap_err().is_not_found());

    let newest = VersionQuery::new("fabric-server", Loader::Fabric, ModType::Launcher);
    assert_eq!(client.resolve_version(&newest).await.unwrap().game_version, "1.21.6");
}

#[tokio::test]
async fn test_content_rows_are_not_fabric_meta() {
    let temp_dir = TempDir::new().unwrap();
    let client = LiveFabricClient::new(networking(temp_dir.path()));
    let query = VersionQuery::new("sodium", Loader::Fabric, ModType::Mod);
    assert!(client.resolve_version(&query).await.unwrap_err().is_not_found());
}
