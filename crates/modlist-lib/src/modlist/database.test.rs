use super::*;
use crate::primitives::ProviderKind;
use tempfile::TempDir;

const SAMPLE: &str = "\
Group,Type,ID,Loader,CurrentGameVersion,CurrentVersion,CurrentVersionUrl,Notes,ApiSource
required,mod,fabric-api,fabric,1.21.5,0.127.1+1.21.5,https://cdn.modrinth.com/fabric-api.jar,core,modrinth
optional,datapack,terralith,fabric,1.21.5,2.5.8,https://cdn.modrinth.com/terralith.zip,,modrinth
block,mod,owner/mod-thing,forge,1.21.4
";

fn sample() -> Database {
    Database::from_reader(SAMPLE.as_bytes()).unwrap()
}

fn render(database: &Database) -> String {
    let mut out = Vec::new();
    database.to_writer(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_from_reader_parses_rows_and_pads_short_ones() {
    let database = sample();
    assert_eq!(database.len(), 3);
    assert_eq!(database.headers().len(), 9);

    let short = &database.records()[2];
    assert_eq!(short.id, "owner/mod-thing");
    assert_eq!(short.loader, Loader::Forge);
    assert!(short.current.is_empty());
    // No ApiSource, Host or Url to go on
    assert_eq!(short.provider, ProviderKind::Direct);
}

#[test]
fn test_round_trip_preserves_columns_and_unknown_values() {
    let database = sample();
    let text = render(&database);
    let mut lines = text.lines();

    assert_eq!(
        lines.next().unwrap(),
        "Group,Type,ID,Loader,CurrentGameVersion,CurrentVersion,CurrentVersionUrl,Notes,ApiSource"
    );
    assert_eq!(
        lines.next().unwrap(),
        "required,mod,fabric-api,fabric,1.21.5,0.127.1+1.21.5,https://cdn.modrinth.com/fabric-api.jar,core,modrinth"
    );

    let reparsed = Database::from_reader(text.as_bytes()).unwrap();
    assert_eq!(reparsed.records(), database.records());
}

#[test]
fn test_new_empty_has_canonical_header() {
    let database = Database::new_empty();
    assert!(database.is_empty());
    assert_eq!(database.headers().len(), columns::CANONICAL.len());
    assert_eq!(database.headers()[0], "Group");
    assert_eq!(database.headers().last().unwrap(), "RecordHash");
}

#[test]
fn test_ensure_schema_appends_missing_columns_only() {
    let mut database = sample();
    let before: Vec<String> = database.headers().to_vec();

    let added = database.ensure_schema();
    assert!(added.contains(&"RecordHash".to_string()));
    assert!(!added.contains(&"ID".to_string()));
    assert_eq!(&database.headers()[..before.len()], before.as_slice());
    assert_eq!(database.headers().len(), before.len() + added.len());
    assert_eq!(database.len(), 3);

    assert!(database.ensure_schema().is_empty());
}

#[test]
fn test_merge_row_touches_only_updated_fields() {
    let database = sample();
    let existing = &database.records()[0];

    let update = RecordUpdate {
        next: Some(VersionSlot::resolved(
            "0.128.0+1.21.6",
            "https://cdn.modrinth.com/fabric-api-next.jar",
            "1.21.6",
        )),
        ..RecordUpdate::default()
    };
    let merged = merge_row(existing, &update);

    assert_eq!(merged.next.version, "0.128.0+1.21.6");
    assert_eq!(merged.current, existing.current);
    assert_eq!(merged.extras, existing.extras);
    assert_eq!(merged.record_hash, merged.compute_hash());
    assert!(!merged.has_drifted());
}

#[test]
fn test_empty_update_only_refreshes_hash() {
    let database = sample();
    let existing = &database.records()[1];
    assert!(RecordUpdate::default().is_empty());

    let merged = merge_row(existing, &RecordUpdate::default());
    assert_eq!(merged.current, existing.current);
    assert_eq!(merged.record_hash, existing.compute_hash());
}

#[test]
fn test_add_record_rejects_duplicates_within_type_and_loader() {
    let mut database = sample();

    let duplicate = ModRecord::new("Fabric-API", ModType::Mod, Loader::Fabric);
    assert!(matches!(
        database.add_record(duplicate),
        Err(DatabaseError::DuplicateRecord { .. })
    ));

    let other_loader = ModRecord::new("fabric-api", ModType::Mod, Loader::Quilt);
    database.add_record(other_loader).unwrap();
    assert_eq!(database.len(), 4);
    assert!(!database.records()[3].record_hash.is_empty());
}

#[test]
fn test_remove_record_leaves_other_rows_untouched() {
    let mut database = sample();
    let before = render(&database);

    let removed = database.remove_record("terralith", None, None).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(database.len(), 2);

    let after = render(&database);
    let before_lines: Vec<&str> = before.lines().collect();
    let after_lines: Vec<&str> = after.lines().collect();
    assert_eq!(after_lines, vec![before_lines[0], before_lines[1], before_lines[3]]);
}

#[test]
fn test_remove_record_with_filters() {
    let mut database = sample();
    let result = database.remove_record("fabric-api", Some(ModType::Datapack), None);
    assert!(matches!(result, Err(DatabaseError::RecordNotFound { .. })));
    assert_eq!(database.len(), 3);

    let removed = database
        .remove_record("OWNER/MOD-THING", Some(ModType::Mod), Some(&Loader::Forge))
        .unwrap();
    assert_eq!(removed[0].id, "owner/mod-thing");
}

#[test]
fn test_find_is_case_insensitive() {
    let database = sample();
    assert!(database.find("FABRIC-API").is_some());
    assert!(database.find("sodium").is_none());
}

#[test]
fn test_load_missing_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let result = Database::load(&temp_dir.path().join("absent.csv"));
    assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
}

#[test]
fn test_save_replaces_file_atomically() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("modlist.csv");
    std::fs::write(&path, SAMPLE).unwrap();

    let mut database = Database::load(&path).unwrap();
    database.remove_record("terralith", None, None).unwrap();
    database.save().unwrap();

    let reloaded = Database::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.headers(), database.headers());

    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path() != path)
        .collect();
    assert!(leftovers.is_empty(), "temporary files must not be left behind");
}

#[test]
fn test_save_without_path_fails() {
    assert!(matches!(
        Database::new_empty().save(),
        Err(DatabaseError::NoPath)
    ));
}

#[test]
fn test_invalid_row_reports_line() {
    let text = "ID,Type\nsodium,spaceship\n";
    match Database::from_reader(text.as_bytes()) {
        Err(DatabaseError::InvalidRow { row, .. }) => assert_eq!(row, 2),
        other => panic!("expected invalid row, got {other:?}"),
    }
}

#[test]
fn test_write_back_keeps_header_spelling_and_overflow_cells() {
    let text = "ID , Type,Notes\nsodium,mod,fast,stray,cells\nlithium,mod,\n";
    let database = Database::from_reader(text.as_bytes()).unwrap();

    assert_eq!(database.headers(), &["ID", "Type", "Notes"]);
    assert_eq!(database.records()[0].id, "sodium");
    assert_eq!(database.records()[0].overflow, vec!["stray", "cells"]);
    assert!(database.records()[1].overflow.is_empty());
    assert_eq!(render(&database), text);
}

#[test]
fn test_merge_keeps_untouched_cells_verbatim() {
    let text = "\
Group,Type,ID,Loader,Description,CurrentGameVersion,CurrentVersion,CurrentVersionUrl,NextVersion
Required,Shaderpack,complementary,, Soft shadows ,1.21.5,r5.4,https://cdn.modrinth.com/c.zip,
";
    let mut database = Database::from_reader(text.as_bytes()).unwrap();
    let update = RecordUpdate {
        next: Some(VersionSlot::resolved("r5.5", "https://cdn.modrinth.com/n.zip", "1.21.6")),
        ..RecordUpdate::default()
    };
    let merged = merge_row(&database.records()[0], &update);
    database.records_mut()[0] = merged;

    let rendered = render(&database);
    let row = rendered.lines().nth(1).unwrap();
    assert_eq!(
        row,
        "Required,Shaderpack,complementary,, Soft shadows ,1.21.5,r5.4,https://cdn.modrinth.com/c.zip,r5.5"
    );
}
