// Tests for GitHub releases client

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

fn asset(name: &str) -> Asset {
    Asset {
        name: name.to_string(),
        browser_download_url: format!("https://github.com/o/r/releases/download/x/{name}"),
    }
}

#[test]
fn test_strip_tag() {
    assert_eq!(strip_tag("v1.2.3"), "1.2.3");
    assert_eq!(strip_tag("1.2.3"), "1.2.3");
    assert_eq!(strip_tag("version-2"), "version-2");
}

#[test]
fn test_parse_repo() {
    assert_eq!(parse_repo("owner/mod-thing"), Some(("owner", "mod-thing")));
    assert_eq!(parse_repo("/owner/repo/"), Some(("owner", "repo")));
    assert_eq!(parse_repo("sodium"), None);
    assert_eq!(parse_repo("a/b/c"), None);
}

#[test]
fn test_asset_tiers() {
    let assets = vec![
        asset("thing-1.2.0-sources.jar"),
        asset("thing-1.2.0.jar"),
        asset("thing-1.2.0-1.21.5.jar"),
    ];
    assert_eq!(
        select_asset(&assets, "1.2.0", Some("1.21.5"), "jar").unwrap().name,
        "thing-1.2.0-1.21.5.jar"
    );
    assert_eq!(
        select_asset(&assets, "1.2.0", Some("1.21.6"), "jar").unwrap().name,
        "thing-1.2.0.jar"
    );
    assert_eq!(
        select_asset(&[asset("whatever.jar")], "1.2.0", None, "jar").unwrap().name,
        "whatever.jar"
    );
}

#[test]
fn test_zip_falls_back_to_jar() {
    let assets = vec![asset("pack-2.0.zip"), asset("pack-2.0.jar")];
    assert_eq!(select_asset(&assets, "2.0", None, "zip").unwrap().name, "pack-2.0.zip");

    let jar_only = vec![asset("pack-2.0.jar")];
    assert_eq!(select_asset(&jar_only, "2.0", None, "zip").unwrap().name, "pack-2.0.jar");
    assert!(select_asset(&[asset("notes.txt")], "2.0", None, "zip").is_none());
}

#[test]
fn test_asset_game_version() {
    assert_eq!(
        asset_game_version("thing-1.2.0-1.21.5.jar", "1.2.0", "jar").as_deref(),
        Some("1.21.5")
    );
    assert_eq!(asset_game_version("thing-1.2.0.jar", "1.2.0", "jar"), None);
    assert_eq!(asset_game_version("thing-1.2.0-sources.jar", "1.2.0", "jar"), None);
}

#[tokio::test]
async fn test_resolve_skips_drafts_and_strips_tag() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/owner/mod-thing/releases")
        .match_query(Matcher::UrlEncoded("per_page".to_string(), "100".to_string()))
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(
            json!([
                {
                    "tag_name": "v2.0.0",
                    "draft": true,
                    "prerelease": false,
                    "published_at": null,
                    "assets": [{"name": "mod-thing-2.0.0.jar", "browser_download_url": "https://x/draft.jar"}]
                },
                {
                    "tag_name": "v1.3.0",
                    "draft": false,
                    "prerelease": false,
                    "published_at": "2025-06-01T00:00:00Z",
                    "assets": [
                        {"name": "mod-thing-1.3.0-1.21.5.jar", "browser_download_url": "https://x/a.jar"},
                        {"name": "mod-thing-1.3.0-1.21.6.jar", "browser_download_url": "https://x/b.jar"}
                    ]
                },
                {
                    "tag_name": "v1.2.0",
                    "draft": false,
                    "prerelease": false,
                    "published_at": "2025-03-01T00:00:00Z",
                    "assets": [{"name": "mod-thing-1.2.0-1.21.4.jar", "browser_download_url": "https://x/c.jar"}]
                }
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = LiveGitHubClient::with_base_url(
        networking(temp_dir.path()),
        server.url(),
        Some("tok".to_string()),
    );

    let current = VersionQuery::new("owner/mod-thing", Loader::Forge, ModType::Mod)
        .with_game_version(Some("1.21.5"));
    let resolved = client.resolve_version(&current).await.unwrap();
    assert_eq!(resolved.version, "1.3.0");
    assert_eq!(resolved.jar_filename, "mod-thing-1.3.0-1.21.5.jar");
    assert_eq!(resolved.available_game_versions, vec!["1.21.4", "1.21.5", "1.21.6"]);

    let latest = VersionQuery::new("owner/mod-thing", Loader::Forge, ModType::Mod);
    let resolved = client.resolve_version(&latest).await.unwrap();
    assert_eq!(resolved.download_url, "https://x/b.jar");
    assert_eq!(resolved.game_version, "1.21.6");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_project_infers_type_from_repo_name() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/owner/shader-glow")
        .with_status(200)
        .with_body(
            json!({
                "name": "shader-glow",
                "full_name": "owner/shader-glow",
                "description": "Glowing shader",
                "html_url": "https://github.com/owner/shader-glow",
                "topics": ["minecraft"],
                "has_issues": true,
                "has_wiki": false
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = LiveGitHubClient::with_base_url(networking(temp_dir.path()), server.url(), None);
    let metadata = client.fetch_project("owner/shader-glow").await.unwrap();
    assert_eq!(metadata.mod_type, Some(ModType::Shader));
    assert_eq!(metadata.id, "owner/shader-glow");
    assert_eq!(metadata.issues_url, "https://github.com/owner/shader-glow/issues");
    assert_eq!(metadata.wiki_url, "");
}

#[tokio::test]
async fn test_bad_repo_id_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let client = LiveGitHubClient::new(networking(temp_dir.path()), None);
    let query = VersionQuery::new("not-a-repo", Loader::Fabric, ModType::Mod);
    assert!(client.resolve_version(&query).await.unwrap_err().is_not_found());
}
