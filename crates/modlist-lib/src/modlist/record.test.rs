use super::*;

fn fields<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
    pairs.iter().copied().collect()
}

fn fabric_api() -> ModRecord {
    let mut record = ModRecord::new("fabric-api", ModType::Mod, Loader::Fabric);
    record.current = VersionSlot::resolved(
        "0.127.1+1.21.5",
        "https://cdn.modrinth.com/data/P7dR8mSH/versions/abc/fabric-api-0.127.1+1.21.5.jar",
        "1.21.5",
    );
    record.jar = "fabric-api-0.127.1+1.21.5.jar".to_string();
    record
}

#[test]
fn test_canonical_columns_are_unique() {
    let mut seen = std::collections::HashSet::new();
    for column in columns::CANONICAL {
        assert!(seen.insert(column), "duplicate column {column}");
    }
    for column in columns::HASHED {
        assert!(columns::is_known(column));
        assert_ne!(column, columns::RECORD_HASH);
    }
}

#[test]
fn test_from_fields_reads_known_columns() {
    let record = ModRecord::from_fields(&fields(&[
        ("Group", "optional"),
        ("Type", "datapack"),
        ("ID", "terralith"),
        ("Loader", "Forge"),
        ("CurrentVersion", "2.5.8"),
        ("CurrentVersionUrl", "https://example.org/terralith.zip"),
        ("CurrentGameVersion", "1.21.5"),
        ("ApiSource", "modrinth"),
        ("AvailableGameVersions", "1.21.4, 1.21.5"),
    ]))
    .unwrap();

    assert_eq!(record.group, ModGroup::Optional);
    assert_eq!(record.mod_type, ModType::Datapack);
    assert_eq!(record.loader, Loader::Forge);
    assert!(record.current.is_resolved());
    assert_eq!(record.available_game_versions, vec!["1.21.4", "1.21.5"]);
    assert!(record.next.is_empty());
    assert!(record.extras.is_empty());
}

#[test]
fn test_missing_columns_default() {
    let record = ModRecord::from_fields(&fields(&[("ID", "sodium")])).unwrap();
    assert_eq!(record.group, ModGroup::Required);
    assert_eq!(record.mod_type, ModType::Mod);
    assert_eq!(record.loader, Loader::Unspecified);
    assert_eq!(record.label(), "sodium (mod)");
    assert_eq!(record.record_hash, "");
}

#[test]
fn test_provider_falls_back_to_url() {
    let record = ModRecord::from_fields(&fields(&[
        ("ID", "owner/mod-thing"),
        ("Url", "https://github.com/owner/mod-thing"),
    ]))
    .unwrap();
    assert_eq!(record.provider, ProviderKind::GitHub);

    let direct = ModRecord::from_fields(&fields(&[
        ("ID", "pack"),
        ("Url", "https://example.org/pack.zip"),
    ]))
    .unwrap();
    assert_eq!(direct.provider, ProviderKind::Direct);
}

#[test]
fn test_invalid_group_is_an_error() {
    let err = ModRecord::from_fields(&fields(&[("ID", "x"), ("Group", "sometimes")])).unwrap_err();
    match err {
        RecordError::InvalidField { column, value, .. } => {
            assert_eq!(column, "Group");
            assert_eq!(value, "sometimes");
        }
    }
}

#[test]
fn test_unknown_columns_go_to_extras() {
    let record = ModRecord::from_fields(&fields(&[("ID", "x"), ("Notes", "keep me")])).unwrap();
    assert_eq!(record.extras.get("Notes").map(String::as_str), Some("keep me"));
    assert_eq!(record.value_of("Notes"), "keep me");
    assert_eq!(record.field("Notes"), None);
}

#[test]
fn test_dependencies_round_trip_as_compact_json() {
    let deps = vec![DependencyRef {
        project_id: "P7dR8mSH".to_string(),
        file_id: None,
        required: true,
        host: ProviderKind::Modrinth,
    }];
    let text = format_dependencies(&deps);
    assert_eq!(
        text,
        r#"[{"project_id":"P7dR8mSH","required":true,"host":"modrinth"}]"#
    );
    assert_eq!(format_dependencies(&[]), "");

    let record = ModRecord::from_fields(&fields(&[
        ("ID", "x"),
        ("CurrentDependenciesRequired", text.as_str()),
    ]))
    .unwrap();
    assert_eq!(record.current_dependencies.required, deps);
}

#[test]
fn test_malformed_dependencies_are_an_error() {
    let result = ModRecord::from_fields(&fields(&[
        ("ID", "x"),
        ("LatestDependenciesOptional", "fabric-api;sodium"),
    ]));
    assert!(result.is_err());
}

#[test]
fn test_dependencies_split_by_required_flag() {
    let dep = |id: &str, required| DependencyRef {
        project_id: id.to_string(),
        file_id: Some("1".to_string()),
        required,
        host: ProviderKind::CurseForge,
    };
    let split = Dependencies::from_refs(vec![dep("a", true), dep("b", false), dep("c", true)]);
    assert_eq!(split.required.len(), 2);
    assert_eq!(split.optional.len(), 1);
    assert!(!split.is_empty());
}

#[test]
fn test_hash_ignores_display_fields_and_extras() {
    let record = fabric_api();
    let hash = record.compute_hash();
    assert_eq!(hash.len(), 64);

    let mut edited = record.clone();
    edited.description = "Core API".to_string();
    edited.name = "Fabric API".to_string();
    edited.extras.insert("Notes".to_string(), "x".to_string());
    assert_eq!(edited.compute_hash(), hash);

    let mut bumped = record.clone();
    bumped.current.version = "0.128.0+1.21.5".to_string();
    assert_ne!(bumped.compute_hash(), hash);
}

#[test]
fn test_drift_detection() {
    let mut record = fabric_api();
    assert!(!record.has_drifted(), "empty hash never drifts");

    record.refresh_hash();
    assert!(!record.has_drifted());

    record.jar = "edited.jar".to_string();
    assert!(record.has_drifted());
}

#[test]
fn test_version_slot_consistency() {
    assert!(VersionSlot::default().is_consistent());
    assert!(VersionSlot::resolved("1.0", "https://x/y.jar", "1.21.5").is_consistent());

    let half = VersionSlot::resolved("1.0", "", "1.21.5");
    assert!(!half.is_consistent());
    assert!(!half.is_resolved());

    let mut slot = VersionSlot::resolved("1.0", "https://x/y.jar", "1.21.5");
    slot.clear();
    assert_eq!(slot, VersionSlot::default());
}

#[test]
fn test_label() {
    assert_eq!(fabric_api().label(), "fabric-api (mod/fabric)");
}

#[test]
fn test_unchanged_cells_keep_their_original_text() {
    let mut record = ModRecord::from_fields(&fields(&[
        ("Group", "Required"),
        ("Type", "Shaderpack"),
        ("ID", "complementary"),
        ("Loader", ""),
        ("ApiSource", ""),
        ("Url", "https://modrinth.com/shader/complementary"),
        ("Description", "  Soft shadows "),
        ("CurrentVersion", "r5.4"),
    ]))
    .unwrap();

    assert_eq!(record.loader, Loader::Unspecified);
    assert_eq!(record.provider, ProviderKind::Modrinth);
    assert_eq!(record.description, "Soft shadows");
    assert_eq!(record.value_of("Group"), "Required");
    assert_eq!(record.value_of("Type"), "Shaderpack");
    assert_eq!(record.value_of("Loader"), "");
    assert_eq!(record.value_of("ApiSource"), "");
    assert_eq!(record.value_of("Description"), "  Soft shadows ");

    record.current.version = "r5.5".to_string();
    record.group = ModGroup::Optional;
    assert_eq!(record.value_of("CurrentVersion"), "r5.5");
    assert_eq!(record.value_of("Group"), "optional");
    assert_eq!(record.value_of("Type"), "Shaderpack");
}
