// Tests for CurseForge API client

use super::*;
use crate::networking::{CacheMode, NetworkingConfig};
use crate::primitives::Loader;
use mockito::{Matcher, Server};
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

fn jei_mod() -> serde_json::Value {
    json!({
        "id": 238222,
        "name": "Just Enough Items (JEI)",
        "slug": "jei",
        "summary": "View items and recipes",
        "classId": 6,
        "links": {"websiteUrl": "https://www.curseforge.com/minecraft/mc-mods/jei", "issuesUrl": "https://github.com/mezz/JustEnoughItems/issues"},
        "logo": {"url": "https://media.forgecdn.net/avatars/jei.png"},
        "categories": [{"name": "API and Library"}]
    })
}

fn file(id: u64, name: &str, game_versions: &[&str], date: &str, download_url: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "displayName": name,
        "fileName": format!("{name}.jar"),
        "releaseType": 1,
        "fileDate": date,
        "downloadUrl": download_url,
        "gameVersions": game_versions,
        "dependencies": [
            {"modId": 306612, "relationType": 3},
            {"modId": 111, "relationType": 2},
            {"modId": 222, "relationType": 6}
        ],
        "hashes": [{"value": "deadbeef", "algo": 1}, {"value": "cafe", "algo": 2}]
    })
}

#[test]
fn test_split_game_versions() {
    let entries: Vec<String> = ["1.21.5", "Fabric", "NeoForge", "Client", "Server", "Java 21", "1.21.4"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (loaders, game_versions) = split_game_versions(&entries);
    assert_eq!(loaders, vec!["fabric", "neoforge"]);
    assert_eq!(game_versions, vec!["1.21.5", "1.21.4"]);
}

#[test]
fn test_edge_url() {
    assert_eq!(
        edge_url(6543210, "jei-1.21.5.jar"),
        "https://edge.forgecdn.net/files/6543/210/jei-1.21.5.jar"
    );
}

#[test]
fn test_missing_key_is_unconfigured() {
    let temp_dir = TempDir::new().unwrap();
    let client = LiveCurseForgeClient::new(networking(temp_dir.path()), Some("  ".to_string()));
    assert!(!client.is_configured());
    assert!(matches!(client.headers(), Err(ResolveError::Configuration { .. })));
}

#[tokio::test]
async fn test_resolve_by_slug_with_pagination() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;

    let search = server
        .mock("GET", "/v1/mods/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("gameId".to_string(), "432".to_string()),
            Matcher::UrlEncoded("slug".to_string(), "jei".to_string()),
        ]))
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_body(json!({"data": [jei_mod()]}).to_string())
        .create_async()
        .await;

    let first_page: Vec<_> = (0..PAGE_SIZE as u64)
        .map(|i| file(1000 + i, &format!("jei-old-{i}"), &["1.20.1", "Forge"], "2024-01-01T00:00:00Z", Some("https://mediafilez.forgecdn.net/old.jar")))
        .collect();
    server
        .mock("GET", "/v1/mods/238222/files")
        .match_query(Matcher::UrlEncoded("index".to_string(), "0".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "data": first_page,
                "pagination": {"index": 0, "pageSize": 50, "resultCount": 50, "totalCount": 52}
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/v1/mods/238222/files")
        .match_query(Matcher::UrlEncoded("index".to_string(), "50".to_string()))
        .with_status(200)
        .with_body(
            json!({
                "data": [
                    file(6543210, "jei-1.21.5-fabric-20.1.0", &["1.21.5", "Fabric"], "2025-05-01T00:00:00Z", None),
                    file(6543211, "jei-1.21.5-forge-20.1.0", &["1.21.5", "Forge"], "2025-05-02T00:00:00Z", Some("https://mediafilez.forgecdn.net/forge.jar"))
                ],
                "pagination": {"index": 50, "pageSize": 50, "resultCount": 2, "totalCount": 52}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = LiveCurseForgeClient::with_base_url(
        networking(temp_dir.path()),
        server.url(),
        Some("secret".to_string()),
    );
    let query = VersionQuery::new("jei", Loader::Fabric, ModType::Mod).with_game_version(Some("1.21.5"));
    let resolved = client.resolve_version(&query).await.unwrap();

    assert_eq!(resolved.version, "jei-1.21.5-fabric-20.1.0");
    assert_eq!(
        resolved.download_url,
        "https://edge.forgecdn.net/files/6543/210/jei-1.21.5-fabric-20.1.0.jar"
    );
    assert_eq!(resolved.sha1.as_deref(), Some("deadbeef"));
    assert_eq!(resolved.available_game_versions, vec!["1.21.5"]);

    let required: Vec<_> = resolved.dependencies.iter().filter(|d| d.required).collect();
    assert_eq!(required.len(), 1);
    assert_eq!(required[0].project_id, "306612");
    assert_eq!(resolved.dependencies.len(), 2);
    search.assert_async().await;
}

#[tokio::test]
async fn test_numeric_id_uses_mod_endpoint() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/mods/238222")
        .with_status(200)
        .with_body(json!({"data": jei_mod()}).to_string())
        .create_async()
        .await;

    let client = LiveCurseForgeClient::with_base_url(
        networking(temp_dir.path()),
        server.url(),
        Some("secret".to_string()),
    );
    let metadata = client.fetch_project("238222").await.unwrap();

    assert_eq!(metadata.id, "jei");
    assert_eq!(metadata.mod_type, Some(ModType::Mod));
    assert_eq!(metadata.url, "https://www.curseforge.com/minecraft/mc-mods/jei");
    assert_eq!(metadata.category, "API and Library");
    assert_eq!(metadata.icon_url, "https://media.forgecdn.net/avatars/jei.png");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/mods/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"data": []}"#)
        .create_async()
        .await;

    let client = LiveCurseForgeClient::with_base_url(
        networking(temp_dir.path()),
        server.url(),
        Some("secret".to_string()),
    );
    let err = client.fetch_project("nothing-here").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_search_without_exact_slug_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mut other = jei_mod();
    other["slug"] = json!("jei-integration");
    other["id"] = json!(999);
    server
        .mock("GET", "/v1/mods/search")
        .match_query(Matcher::UrlEncoded("slug".to_string(), "jei".to_string()))
        .with_status(200)
        .with_body(json!({"data": [other]}).to_string())
        .create_async()
        .await;
    let files = server
        .mock("GET", Matcher::Regex(r"^/v1/mods/999/files".to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = LiveCurseForgeClient::with_base_url(
        networking(temp_dir.path()),
        server.url(),
        Some("secret".to_string()),
    );
    let query = VersionQuery::new("jei", Loader::Forge, ModType::Mod);
    let err = client.resolve_version(&query).await.unwrap_err();
    assert!(err.is_not_found());
    files.assert_async().await;
}
