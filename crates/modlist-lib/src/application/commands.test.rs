use super::*;
use crate::api::{MockVersionProvider, ProjectMetadata, ProviderRegistry, ResolvedVersion};
use crate::application::cli::AddArgs;
use crate::application::config::AppConfig;
use crate::primitives::{ProviderKind, SlotKind};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const DATABASE: &str = "\
Group,Type,CurrentGameVersion,ID,Loader,CurrentVersion,Jar,CurrentVersionUrl,ApiSource,Notes
required,mod,1.21.5,fabric-api,fabric,0.127.1+1.21.5,fabric-api.jar,https://cdn.modrinth.com/fabric-api.jar,modrinth,keep me
required,launcher,1.21.5,fabric-server,fabric,0.16.14,fabric-server-launch.jar,https://meta.fabricmc.net/launch.jar,fabric,
block,mod,1.21.5,broken,fabric,1.0,broken.jar,https://cdn.modrinth.com/broken.jar,modrinth,
";

fn resolved(version: &str, game_version: &str) -> ResolvedVersion {
    ResolvedVersion {
        version: version.to_string(),
        download_url: format!("https://cdn.modrinth.com/{version}.jar"),
        jar_filename: format!("{version}.jar"),
        game_version: game_version.to_string(),
        ..ResolvedVersion::default()
    }
}

fn registry() -> ProviderRegistry {
    let modrinth = MockVersionProvider::new(ProviderKind::Modrinth)
        .with_version("fabric-api", Some("1.21.5"), resolved("0.127.1+1.21.5", "1.21.5"))
        .with_version("fabric-api", Some("1.21.6"), resolved("0.128.1+1.21.6", "1.21.6"))
        .with_version("fabric-api", None, resolved("0.128.1+1.21.6", "1.21.6"))
        .with_version("sodium", Some("1.21.5"), resolved("0.6.14", "1.21.5"))
        .with_project(
            "sodium",
            ProjectMetadata {
                id: "sodium".to_string(),
                name: "Sodium".to_string(),
                ..ProjectMetadata::default()
            },
        );
    let fabric = MockVersionProvider::new(ProviderKind::Fabric)
        .with_version("fabric-server", Some("1.21.5"), resolved("0.16.14", "1.21.5"))
        .with_version("fabric-server", None, resolved("0.16.14", "1.21.6"));

    ProviderRegistry::new()
        .with_provider(Arc::new(modrinth))
        .with_provider(Arc::new(fabric))
}

fn session(dir: &Path) -> CommandSession {
    let config = AppConfig {
        database_file: dir.join("modlist.csv"),
        api_response_folder: Some(dir.join("responses")),
        download_folder: dir.join("downloads"),
        ..AppConfig::default()
    };
    CommandSession::with_registry(config, registry()).unwrap()
}

fn write_database(dir: &Path) {
    std::fs::write(dir.join("modlist.csv"), DATABASE).unwrap();
}

#[tokio::test]
async fn test_validate_updates_file() {
    let temp_dir = TempDir::new().unwrap();
    write_database(temp_dir.path());
    let session = session(temp_dir.path());

    execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session)
        .await
        .unwrap();

    let database = Database::load(&temp_dir.path().join("modlist.csv")).unwrap();
    let fabric_api = database.find("fabric-api").unwrap();
    assert_eq!(fabric_api.current.version, "0.127.1+1.21.5");
    assert_eq!(fabric_api.next.version, "0.128.1+1.21.6");
    assert_eq!(fabric_api.next.game_version, "1.21.6");
    assert_eq!(fabric_api.extras.get("Notes").map(String::as_str), Some("keep me"));
    assert_eq!(database.len(), 3);
    assert_eq!(&database.headers()[..3], &["Group", "Type", "CurrentGameVersion"]);
}

#[tokio::test]
async fn test_missing_database_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let session = session(temp_dir.path());

    let result = execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await;
    assert!(result.is_err());
    assert!(!temp_dir.path().join("modlist.csv").exists());
}

#[tokio::test]
async fn test_add_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let session = session(temp_dir.path());

    let args = AddArgs {
        source: "https://modrinth.com/mod/sodium".to_string(),
        game_version: Some("1.21.5".to_string()),
        ..AddArgs::default()
    };
    execute_command_with_session(Commands::Add(args), &session).await.unwrap();

    let database = Database::load(&temp_dir.path().join("modlist.csv")).unwrap();
    assert_eq!(database.len(), 1);
    assert_eq!(database.records()[0].current.version, "0.6.14");
}

#[tokio::test]
async fn test_remove_keeps_other_rows() {
    let temp_dir = TempDir::new().unwrap();
    write_database(temp_dir.path());
    let session = session(temp_dir.path());

    let remove = Commands::Remove {
        id: "broken".to_string(),
        mod_type: None,
        loader: None,
    };
    execute_command_with_session(remove, &session).await.unwrap();

    let database = Database::load(&temp_dir.path().join("modlist.csv")).unwrap();
    assert_eq!(database.len(), 2);
    assert!(database.find("broken").is_none());
    assert!(database.headers().iter().any(|h| h == "Notes"));

    let missing = Commands::Remove {
        id: "broken".to_string(),
        mod_type: None,
        loader: None,
    };
    assert!(execute_command_with_session(missing, &session).await.is_err());
}

#[tokio::test]
async fn test_list_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    write_database(temp_dir.path());
    let session = session(temp_dir.path());

    execute_command_with_session(
        Commands::List {
            group: Some(ModGroup::Required),
            mod_type: None,
        },
        &session,
    )
    .await
    .unwrap();

    let text = std::fs::read_to_string(temp_dir.path().join("modlist.csv")).unwrap();
    assert_eq!(text, DATABASE);
}

#[tokio::test]
async fn test_download_mods_counts_failures_without_failing() {
    let temp_dir = TempDir::new().unwrap();
    let text = "ID,Type,CurrentGameVersion,CurrentVersion,CurrentVersionUrl,ApiSource\n\
                gone,mod,1.21.5,1.0,http://127.0.0.1:9/gone.jar,direct\n";
    std::fs::write(temp_dir.path().join("modlist.csv"), text).unwrap();

    let mut config = session(temp_dir.path()).config().clone();
    config.max_retries = 0;
    config.net_timeout = 2;
    let session = CommandSession::with_registry(config, registry()).unwrap();

    let args = DownloadArgs {
        slot: SlotKind::Current,
        force: false,
    };
    execute_command_with_session(Commands::DownloadMods(args), &session)
        .await
        .unwrap();
    assert!(!temp_dir.path().join("downloads/1.21.5/mods/gone.jar").exists());
}

#[test]
fn test_server_jar_prefers_launcher() {
    let database = Database::from_reader(DATABASE.as_bytes()).unwrap();
    assert_eq!(
        server_jar(database.records(), "1.21.5").as_deref(),
        Some("fabric-server-launch.jar")
    );
    assert_eq!(server_jar(database.records(), "1.20.1"), None);
}

#[tokio::test]
async fn test_start_server_without_jar_fails() {
    let temp_dir = TempDir::new().unwrap();
    write_database(temp_dir.path());
    let session = session(temp_dir.path());

    let args = ServerArgs {
        timeout: 1,
        ..ServerArgs::default()
    };
    let result = execute_command_with_session(Commands::StartServer(args), &session).await;
    assert!(result.is_err());
    assert!(!temp_dir.path().join("downloads/1.21.5/eula.txt").exists());
}

#[test]
fn test_row_details_cover_only_rows_needing_attention() {
    let row = |label: &str, outcome: RowOutcome, drifted: bool| crate::modlist::RowReport {
        label: label.to_string(),
        outcome,
        drifted,
        changed: false,
        update_available: false,
        supports_next: None,
    };
    let report = ReconcileReport {
        rows: vec![
            row("fabric-api (mod/fabric)", RowOutcome::Resolved, false),
            row("sodium (mod/fabric)", RowOutcome::NotFound { reason: "gone".to_string() }, false),
            row("lithium (mod/fabric)", RowOutcome::Resolved, true),
        ],
        ..ReconcileReport::default()
    };

    let lines = row_details(&report);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("sodium (mod/fabric): not found"));
    assert_eq!(lines[1], "lithium (mod/fabric): edited outside modlist");
}

#[tokio::test]
async fn test_start_server_rejects_folder_outside_downloads() {
    let temp_dir = TempDir::new().unwrap();
    write_database(temp_dir.path());
    let session = session(temp_dir.path());

    let args = ServerArgs {
        game_version: Some("../..".to_string()),
        jar: Some("server.jar".to_string()),
        timeout: 1,
        ..ServerArgs::default()
    };
    let err = execute_command_with_session(Commands::StartServer(args), &session)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("server folder name"));
}

#[tokio::test]
async fn test_validate_keeps_cells_it_does_not_change() {
    let temp_dir = TempDir::new().unwrap();
    let text = "\
Group,Type,CurrentGameVersion,ID,Loader,CurrentVersion,Jar,CurrentVersionUrl,ApiSource,Notes
Required,Mod,1.21.5,fabric-api,,0.127.1+1.21.5,fabric-api.jar,https://cdn.modrinth.com/fabric-api.jar,Modrinth, keep me
";
    std::fs::write(temp_dir.path().join("modlist.csv"), text).unwrap();
    let session = session(temp_dir.path());

    execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session)
        .await
        .unwrap();

    let written = std::fs::read_to_string(temp_dir.path().join("modlist.csv")).unwrap();
    let row = written.lines().nth(1).unwrap();
    assert!(row.starts_with("Required,Mod,1.21.5,fabric-api,,0.127.1+1.21.5,"), "{row}");
    assert!(row.contains(",Modrinth, keep me,"), "{row}");

    let database = Database::load(&temp_dir.path().join("modlist.csv")).unwrap();
    let record = database.find("fabric-api").unwrap();
    assert!(record.loader.is_unspecified());
    assert_eq!(record.next.version, "0.128.1+1.21.6");
}
