// Tests for Modrinth API client

use super::*;
use crate::networking::{CacheMode, NetworkingConfig};
use crate::primitives::Loader;
use mockito::Server;
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

fn fabric_api_versions() -> serde_json::Value {
    json!([
        {
            "version_number": "0.128.1+1.21.6",
            "version_type": "release",
            "loaders": ["fabric"],
            "game_versions": ["1.21.6"],
            "date_published": "2025-06-20T10:00:00Z",
            "dependencies": [],
            "files": [{
                "url": "https://cdn.modrinth.com/data/P7dR8mSH/versions/n/fabric-api-0.128.1+1.21.6.jar",
                "filename": "fabric-api-0.128.1+1.21.6.jar",
                "primary": true,
                "hashes": {"sha1": "aaaa", "sha512": "bbbb"}
            }]
        },
        {
            "version_number": "0.127.1+1.21.5",
            "version_type": "release",
            "loaders": ["fabric"],
            "game_versions": ["1.21.5"],
            "date_published": "2025-05-01T10:00:00Z",
            "dependencies": [
                {"project_id": "dep1", "version_id": null, "dependency_type": "required"},
                {"project_id": "dep2", "version_id": "v2", "dependency_type": "optional"},
                {"project_id": "dep3", "version_id": null, "dependency_type": "embedded"}
            ],
            "files": [
                {"url": "https://cdn.modrinth.com/sources.jar", "filename": "sources.jar", "primary": false, "hashes": {}},
                {"url": "https://cdn.modrinth.com/fabric-api-0.127.1+1.21.5.jar", "filename": "fabric-api-0.127.1+1.21.5.jar", "primary": true, "hashes": {"sha1": "cccc"}}
            ]
        },
        {
            "version_number": "0.127.2-beta+1.21.5",
            "version_type": "beta",
            "loaders": ["fabric"],
            "game_versions": ["1.21.5"],
            "date_published": "2025-05-20T10:00:00Z",
            "files": [{"url": "https://cdn.modrinth.com/beta.jar", "filename": "beta.jar", "primary": true}]
        }
    ])
}

#[tokio::test]
async fn test_resolve_picks_release_for_game_version() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/project/fabric-api/version")
        .with_status(200)
        .with_body(fabric_api_versions().to_string())
        .expect(1)
        .create_async()
        .await;

    let client = LiveModrinthClient::with_base_url(networking(temp_dir.path()), server.url());
    let query = VersionQuery::new("fabric-api", Loader::Fabric, ModType::Mod)
        .with_game_version(Some("1.21.5"));

    let resolved = client.resolve_version(&query).await.unwrap();
    assert_eq!(resolved.version, "0.127.1+1.21.5");
    assert_eq!(resolved.jar_filename, "fabric-api-0.127.1+1.21.5.jar");
    assert_eq!(resolved.game_version, "1.21.5");
    assert_eq!(resolved.sha1.as_deref(), Some("cccc"));
    assert_eq!(resolved.available_game_versions, vec!["1.21.5", "1.21.6"]);

    // Embedded dependencies are not tracked
    assert_eq!(resolved.dependencies.len(), 2);
    assert!(resolved.dependencies[0].required);
    assert_eq!(resolved.dependencies[1].file_id.as_deref(), Some("v2"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_resolve_next_game_version() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/fabric-api/version")
        .with_status(200)
        .with_body(fabric_api_versions().to_string())
        .create_async()
        .await;

    let client = LiveModrinthClient::with_base_url(networking(temp_dir.path()), server.url());
    let query = VersionQuery::new("fabric-api", Loader::Fabric, ModType::Mod)
        .with_game_version(Some("1.21.6"));

    let resolved = client.resolve_version(&query).await.unwrap();
    assert_eq!(resolved.version, "0.128.1+1.21.6");

    let missing = VersionQuery::new("fabric-api", Loader::Forge, ModType::Mod)
        .with_game_version(Some("1.21.6"));
    assert!(client.resolve_version(&missing).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_unknown_project_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/nope/version")
        .with_status(404)
        .create_async()
        .await;

    let client = LiveModrinthClient::with_base_url(networking(temp_dir.path()), server.url());
    let query = VersionQuery::new("nope", Loader::Fabric, ModType::Mod);
    let err = client.resolve_version(&query).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/sodium/version")
        .with_status(502)
        .create_async()
        .await;

    let client = LiveModrinthClient::with_base_url(networking(temp_dir.path()), server.url());
    let query = VersionQuery::new("sodium", Loader::Fabric, ModType::Mod);
    assert!(matches!(
        client.resolve_version(&query).await,
        Err(ResolveError::Transient { .. })
    ));
}

#[tokio::test]
async fn test_malformed_payload_is_invalid_response() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/sodium/version")
        .with_status(200)
        .with_body(r#"{"not":"a list"}"#)
        .create_async()
        .await;

    let client = LiveModrinthClient::with_base_url(networking(temp_dir.path()), server.url());
    let query = VersionQuery::new("sodium", Loader::Fabric, ModType::Mod);
    assert!(matches!(
        client.resolve_version(&query).await,
        Err(ResolveError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn test_fetch_project_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/project/terralith")
        .with_status(200)
        .with_body(
            json!({
                "id": "8oi3bsk5",
                "slug": "terralith",
                "title": "Terralith",
                "description": "Overworld evolved",
                "categories": ["worldgen", "adventure"],
                "client_side": "optional",
                "server_side": "required",
                "project_type": "mod",
                "loaders": ["datapack"],
                "icon_url": "https://cdn.modrinth.com/icon.png",
                "issues_url": null,
                "source_url": "https://github.com/Stardust-Labs-MC/Terralith",
                "wiki_url": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = LiveModrinthClient::with_base_url(networking(temp_dir.path()), server.url());
    let metadata = client.fetch_project("terralith").await.unwrap();

    assert_eq!(metadata.id, "terralith");
    assert_eq!(metadata.mod_type, Some(ModType::Datapack));
    assert_eq!(metadata.url, "https://modrinth.com/datapack/terralith");
    assert_eq!(metadata.category, "worldgen,adventure");
    assert_eq!(metadata.issues_url, "");
}
