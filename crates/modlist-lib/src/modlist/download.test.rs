use super::*;
use crate::modlist::record::VersionSlot;
use crate::networking::{BackoffConfig, CacheMode, NetworkingConfig};
use crate::primitives::{Loader, ModType};
use mockito::Server;
use std::time::Duration;
use tempfile::TempDir;

fn manager(cache_dir: &Path) -> NetworkingManager {
    NetworkingManager::new(NetworkingConfig {
        timeout_seconds: 5,
        max_retries: 0,
        backoff: BackoffConfig {
            initial: Duration::from_millis(5),
            max: Duration::from_millis(10),
            multiplier: 2.0,
        },
        cache_dir: cache_dir.to_path_buf(),
        cache_mode: CacheMode::Refresh,
        ..NetworkingConfig::default()
    })
    .unwrap()
}

fn record(id: &str, mod_type: ModType, url: &str, jar: &str) -> ModRecord {
    let mut record = ModRecord::new(id, mod_type, Loader::Fabric);
    record.current = VersionSlot::resolved("1.0", url, "1.21.5");
    record.jar = jar.to_string();
    record
}

#[test]
fn test_destination_layout() {
    let root = Path::new("/srv/mc");

    let mod_item = DownloadItem::for_record(
        &record("sodium", ModType::Mod, "https://cdn/sodium.jar", "sodium-0.6.jar"),
        SlotKind::Current,
        root,
    )
    .unwrap();
    assert_eq!(mod_item.destination, root.join("1.21.5/mods/sodium-0.6.jar"));

    let shader = DownloadItem::for_record(
        &record("bsl", ModType::Shader, "https://cdn/BSL%20v8.zip", ""),
        SlotKind::Current,
        root,
    )
    .unwrap();
    assert_eq!(shader.destination, root.join("1.21.5/shaderpacks/BSL v8.zip"));

    let server = DownloadItem::for_record(
        &record("minecraft", ModType::Server, "https://mojang/server.jar", "minecraft_server.1.21.5.jar"),
        SlotKind::Current,
        root,
    )
    .unwrap();
    assert_eq!(server.destination, root.join("1.21.5/minecraft_server.1.21.5.jar"));
}

#[test]
fn test_next_slot_uses_its_own_game_version() {
    let mut sodium = record("sodium", ModType::Mod, "https://cdn/sodium.jar", "sodium-0.6.jar");
    sodium.next = VersionSlot::resolved("0.7", "https://cdn/sodium-0.7.jar?x=1", "1.21.6");

    let item = DownloadItem::for_record(&sodium, SlotKind::Next, Path::new("out")).unwrap();
    assert_eq!(item.destination, Path::new("out/1.21.6/mods/sodium-0.7.jar"));

    let empty = DownloadItem::for_record(&sodium, SlotKind::Latest, Path::new("out"));
    assert!(matches!(empty, Err(DownloadError::MissingUrl { .. })));
}

#[test]
fn test_destination_never_leaves_the_root() {
    let root = Path::new("/srv/mc");

    let encoded = DownloadItem::for_record(
        &record("evil", ModType::Mod, "https://cdn/x/..%2F..%2F..%2Fevil.jar", ""),
        SlotKind::Current,
        root,
    )
    .unwrap();
    assert_eq!(encoded.destination, root.join("1.21.5/mods/evil.jar"));
    assert_eq!(file_name_from_url("https://cdn/x/%2E%2E"), "download");

    let jar = DownloadItem::for_record(
        &record("evil", ModType::Mod, "https://cdn/evil.jar", "../../.bashrc"),
        SlotKind::Current,
        root,
    );
    assert!(matches!(jar, Err(DownloadError::UnsafePath { what: "file name", .. })));

    let mut climbing = record("evil", ModType::Mod, "https://cdn/evil.jar", "evil.jar");
    climbing.current.game_version = "../..".to_string();
    let game = DownloadItem::for_record(&climbing, SlotKind::Current, root);
    assert!(matches!(game, Err(DownloadError::UnsafePath { what: "folder name", .. })));
}

#[tokio::test]
async fn test_download_all_counts_outcomes() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let ok = server
        .mock("GET", "/sodium.jar")
        .with_status(200)
        .with_body("jar-bytes")
        .expect(1)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/gone.jar")
        .with_status(404)
        .create_async()
        .await;

    let root = temp_dir.path().join("downloads");
    let mut blocked = record("blocked", ModType::Mod, &format!("{}/blocked.jar", server.url()), "blocked.jar");
    blocked.group = ModGroup::Block;
    let records = vec![
        record("sodium", ModType::Mod, &format!("{}/sodium.jar", server.url()), "sodium.jar"),
        record("gone", ModType::Mod, &format!("{}/gone.jar", server.url()), "gone.jar"),
        blocked,
    ];

    let networking = manager(&temp_dir.path().join("cache"));
    let downloader = Downloader::new(&networking, DownloadOptions::new(&root));

    let summary = downloader.download_all(&records).await;
    assert_eq!(
        summary,
        DownloadSummary {
            downloaded: 1,
            skipped: 0,
            failed: 1
        }
    );
    let written = std::fs::read_to_string(root.join("1.21.5/mods/sodium.jar")).unwrap();
    assert_eq!(written, "jar-bytes");
    assert!(!root.join("1.21.5/mods/blocked.jar").exists());

    // Second run finds the file already in place
    let mut seen = Vec::new();
    let again = downloader
        .download_all_with(&records[..1], |label, outcome| seen.push((label.to_string(), outcome.clone())))
        .await;
    assert_eq!(again.skipped, 1);
    assert_eq!(seen[0].1, DownloadOutcome::Skipped);
    ok.assert_async().await;
}

#[tokio::test]
async fn test_force_downloads_again() {
    let temp_dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/lithium.jar")
        .with_status(200)
        .with_body("new")
        .expect(1)
        .create_async()
        .await;

    let root = temp_dir.path().join("downloads");
    std::fs::create_dir_all(root.join("1.21.5/mods")).unwrap();
    std::fs::write(root.join("1.21.5/mods/lithium.jar"), "old").unwrap();

    let networking = manager(&temp_dir.path().join("cache"));
    let options = DownloadOptions {
        force: true,
        ..DownloadOptions::new(&root)
    };
    let records = vec![record(
        "lithium",
        ModType::Mod,
        &format!("{}/lithium.jar", server.url()),
        "lithium.jar",
    )];

    let summary = Downloader::new(&networking, options).download_all(&records).await;
    assert_eq!(summary.downloaded, 1);
    assert_eq!(
        std::fs::read_to_string(root.join("1.21.5/mods/lithium.jar")).unwrap(),
        "new"
    );
    mock.assert_async().await;
}
