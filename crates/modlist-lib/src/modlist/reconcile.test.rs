use super::*;
use crate::api::{MockVersionProvider, ResolvedVersion};
use crate::primitives::{ModGroup, ProviderKind};
use std::sync::Arc;

const DATABASE: &str = "\
Group,Type,CurrentGameVersion,ID,Loader,CurrentVersion,Jar,CurrentVersionUrl,ApiSource,Notes
required,mod,1.21.5,fabric-api,fabric,0.127.1+1.21.5,fabric-api-0.127.1+1.21.5.jar,https://cdn.modrinth.com/fabric-api-0.127.1.jar,modrinth,core
required,mod,1.21.5,sodium,fabric,0.6.13,sodium-0.6.13.jar,https://cdn.modrinth.com/sodium-0.6.13.jar,modrinth,
optional,mod,1.21.4,owner/mod-thing,fabric,1.0.0,mod-thing-1.0.0.jar,https://github.com/owner/mod-thing/1.0.0.jar,github,
required,datapack,1.21.5,pack,fabric,1.0,pack.zip,https://example.org/pack.zip,direct,
";

fn resolved(version: &str, game_version: &str) -> ResolvedVersion {
    ResolvedVersion {
        version: version.to_string(),
        download_url: format!("https://cdn.modrinth.com/{version}.jar"),
        jar_filename: format!("{version}.jar"),
        game_version: game_version.to_string(),
        available_game_versions: vec!["1.21.5".to_string(), "1.21.6".to_string()],
        ..ResolvedVersion::default()
    }
}

fn modrinth() -> MockVersionProvider {
    MockVersionProvider::new(ProviderKind::Modrinth)
        .with_version("fabric-api", Some("1.21.5"), resolved("0.127.1+1.21.5", "1.21.5"))
        .with_version("fabric-api", Some("1.21.6"), resolved("0.128.1+1.21.6", "1.21.6"))
        .with_version("fabric-api", None, resolved("0.128.1+1.21.6", "1.21.6"))
        .with_version("sodium", Some("1.21.5"), resolved("0.6.14", "1.21.5"))
        .with_version("sodium", None, resolved("0.6.14", "1.21.5"))
}

fn github() -> MockVersionProvider {
    MockVersionProvider::new(ProviderKind::GitHub).with_failure("owner/mod-thing")
}

fn registry() -> ProviderRegistry {
    ProviderRegistry::new()
        .with_provider(Arc::new(modrinth()))
        .with_provider(Arc::new(github()))
}

fn database() -> Database {
    Database::from_reader(DATABASE.as_bytes()).unwrap()
}

fn render(database: &Database) -> String {
    let mut out = Vec::new();
    database.to_writer(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_targets_follow_majority() {
    let db = database();
    let targets = Targets::compute(db.records(), &ReconcileOptions::default());
    assert_eq!(targets.majority.as_deref(), Some("1.21.5"));
    assert_eq!(targets.next.as_deref(), Some("1.21.6"));

    let overridden = Targets::compute(
        db.records(),
        &ReconcileOptions {
            next_game_version: Some("1.22".to_string()),
            ..ReconcileOptions::default()
        },
    );
    assert_eq!(overridden.next.as_deref(), Some("1.22"));

    let empty = Targets::compute(&[], &ReconcileOptions::default());
    assert_eq!(empty, Targets::default());
}

#[tokio::test]
async fn test_validate_fills_next_and_keeps_current() {
    let registry = registry();
    let mut db = database();

    let report = Reconciler::new(&registry, ReconcileOptions::default())
        .reconcile(&mut db)
        .await
        .unwrap();

    let fabric_api = db.find("fabric-api").unwrap();
    assert_eq!(fabric_api.current.version, "0.127.1+1.21.5");
    assert_eq!(fabric_api.next.version, "0.128.1+1.21.6");
    assert_eq!(fabric_api.next.url, "https://cdn.modrinth.com/0.128.1+1.21.6.jar");
    assert_eq!(fabric_api.next.game_version, "1.21.6");
    assert_eq!(fabric_api.latest.version, "0.128.1+1.21.6");
    assert_eq!(fabric_api.available_game_versions, vec!["1.21.5", "1.21.6"]);
    assert_eq!(fabric_api.extras.get("Notes").map(String::as_str), Some("core"));
    assert!(!fabric_api.has_drifted());

    // Sodium has a newer build but validate keeps the pin
    let sodium = db.find("sodium").unwrap();
    assert_eq!(sodium.current.version, "0.6.13");
    assert!(sodium.next.is_empty());

    let summary = report.summary;
    assert_eq!(summary.total, 4);
    assert_eq!(summary.supporting_latest, 1);
    assert_eq!(summary.not_supporting_latest, 1);
    assert_eq!(summary.update_available, 1);
    assert_eq!(summary.errored, 1);
    assert_eq!(summary.not_found, 0);
    assert_eq!(db.len(), 4);
}

#[tokio::test]
async fn test_update_replaces_current() {
    let registry = registry();
    let mut db = database();

    Reconciler::new(
        &registry,
        ReconcileOptions {
            mode: ReconcileMode::Update,
            ..ReconcileOptions::default()
        },
    )
    .reconcile(&mut db)
    .await
    .unwrap();

    let sodium = db.find("sodium").unwrap();
    assert_eq!(sodium.current.version, "0.6.14");
    assert_eq!(sodium.current.url, "https://cdn.modrinth.com/0.6.14.jar");
    assert_eq!(sodium.current.game_version, "1.21.5");
    assert_eq!(sodium.jar, "0.6.14.jar");
}

#[tokio::test]
async fn test_failures_leave_rows_untouched() {
    let registry = registry();
    let mut db = database();
    let before = db.find("owner/mod-thing").unwrap().clone();
    let direct_before = db.find("pack").unwrap().clone();

    let report = Reconciler::new(&registry, ReconcileOptions::default())
        .reconcile(&mut db)
        .await
        .unwrap();

    assert_eq!(db.find("owner/mod-thing").unwrap(), &before);
    assert_eq!(db.find("pack").unwrap(), &direct_before);

    let outcomes: Vec<_> = report.rows.iter().map(|row| &row.outcome).collect();
    assert!(matches!(outcomes[2], RowOutcome::Errored { .. }));
    assert_eq!(outcomes[3], &RowOutcome::Skipped);
}

#[tokio::test]
async fn test_unknown_project_is_not_found() {
    let registry = ProviderRegistry::new()
        .with_provider(Arc::new(MockVersionProvider::new(ProviderKind::Modrinth)))
        .with_provider(Arc::new(github()));
    let mut db = database();

    let report = Reconciler::new(&registry, ReconcileOptions::default())
        .reconcile(&mut db)
        .await
        .unwrap();
    assert_eq!(report.summary.not_found, 2);
    assert!(db.find("fabric-api").unwrap().next.is_empty());
}

#[tokio::test]
async fn test_validate_is_idempotent() {
    let registry = registry();
    let mut db = database();
    let reconciler = Reconciler::new(&registry, ReconcileOptions::default());

    reconciler.reconcile(&mut db).await.unwrap();
    let first = render(&db);

    let second_report = reconciler.reconcile(&mut db).await.unwrap();
    assert_eq!(render(&db), first);
    assert_eq!(second_report.summary.updated, 0);
    assert_eq!(second_report.summary.externally_modified, 0);
}

#[tokio::test]
async fn test_out_of_band_edit_is_reported() {
    let registry = registry();
    let mut db = database();
    let reconciler = Reconciler::new(&registry, ReconcileOptions::default());
    reconciler.reconcile(&mut db).await.unwrap();

    // Edit a hashed column without touching the stored hash
    let stale = db.records()[0].record_hash.clone();
    db.records_mut()[0].jar = "hand-edited.jar".to_string();
    db.records_mut()[0].record_hash = stale;
    assert!(db.records()[0].has_drifted());

    let report = reconciler.reconcile(&mut db).await.unwrap();
    assert!(report.rows[0].drifted);
    assert!(!db.records()[0].has_drifted());
}

#[tokio::test]
async fn test_hand_edited_row_counts_as_externally_modified() {
    let registry = registry();
    let mut db = database();
    let reconciler = Reconciler::new(&registry, ReconcileOptions::default());
    reconciler.reconcile(&mut db).await.unwrap();
    let stale = db.records()[0].record_hash.clone();

    // Someone moves fabric-api to another group in a text editor
    let edited = render(&db).replacen("required,mod,1.21.5,fabric-api,", "optional,mod,1.21.5,fabric-api,", 1);
    let mut db = Database::from_reader(edited.as_bytes()).unwrap();
    assert!(db.records()[0].has_drifted());

    let report = reconciler.reconcile(&mut db).await.unwrap();
    assert!(report.rows[0].drifted);
    assert!(!report.rows[0].changed);
    assert_eq!(report.summary.externally_modified, 1);
    assert_eq!(report.summary.updated, 0);

    let record = &db.records()[0];
    assert_eq!(record.group, ModGroup::Optional);
    assert_ne!(record.record_hash, stale);
    assert_eq!(record.record_hash, record.compute_hash());
    assert!(render(&db).contains("optional,mod,1.21.5,fabric-api,"));
}

#[tokio::test]
async fn test_missing_credentials_abort_before_any_row() {
    let registry = ProviderRegistry::new().with_provider(Arc::new(
        MockVersionProvider::new(ProviderKind::CurseForge).unconfigured(),
    ));
    let text = "ID,ApiSource\njei,curseforge\n";
    let mut db = Database::from_reader(text.as_bytes()).unwrap();
    let before = render(&db);

    let result = Reconciler::new(&registry, ReconcileOptions::default())
        .reconcile(&mut db)
        .await;
    assert!(matches!(result, Err(ReconcileError::Configuration { .. })));
    assert_eq!(render(&db), before);
}

#[test]
fn test_summary_counts_outcomes() {
    let mut summary = UpdateSummary::default();
    let record = ModRecord::new("x", crate::primitives::ModType::Mod, crate::primitives::Loader::Fabric);

    summary.record(&RowReport::new(&record, RowOutcome::Skipped));
    summary.record(&RowReport::new(
        &record,
        RowOutcome::NotFound {
            reason: "gone".to_string(),
        },
    ));
    let mut resolved = RowReport::new(&record, RowOutcome::Resolved);
    resolved.changed = true;
    resolved.supports_next = Some(true);
    summary.record(&resolved);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.supporting_latest, 1);
    assert_eq!(summary.entries()[0], ("Total", 3));
}
