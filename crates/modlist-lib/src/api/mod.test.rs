use super::*;

fn candidate(version: &str, game_versions: &[&str], loaders: &[&str], published: &str) -> ReleaseCandidate {
    ReleaseCandidate {
        version: version.to_string(),
        download_url: format!("https://cdn.example.org/{version}.jar"),
        file_name: format!("{version}.jar"),
        game_versions: game_versions.iter().map(|s| s.to_string()).collect(),
        loaders: loaders.iter().map(|s| s.to_string()).collect(),
        published: published.to_string(),
        ..ReleaseCandidate::default()
    }
}

fn query(mod_type: ModType, game_version: Option<&str>) -> VersionQuery {
    VersionQuery::new("test", Loader::Fabric, mod_type).with_game_version(game_version)
}

fn sample() -> Vec<ReleaseCandidate> {
    vec![
        candidate("1.0.0", &["1.21.4"], &["fabric"], "2025-01-01T00:00:00Z"),
        candidate("1.1.0", &["1.21.5"], &["fabric"], "2025-03-01T00:00:00Z"),
        candidate("1.1.0-forge", &["1.21.5"], &["forge"], "2025-03-02T00:00:00Z"),
        candidate("1.2.0", &["1.21.5", "1.21.6"], &["fabric", "quilt"], "2025-06-01T00:00:00Z"),
    ]
}

#[test]
fn test_select_filters_by_loader_and_game_version() {
    let releases = sample();
    let picked = select_release(&releases, &query(ModType::Mod, Some("1.21.4"))).unwrap();
    assert_eq!(picked.version, "1.0.0");

    let picked = select_release(&releases, &query(ModType::Mod, Some("1.21.5"))).unwrap();
    assert_eq!(picked.version, "1.2.0");

    assert!(select_release(&releases, &query(ModType::Mod, Some("1.21.7"))).is_none());
}

#[test]
fn test_datapacks_ignore_loader() {
    let releases = vec![candidate("2.5.8", &["1.21.5"], &["datapack"], "2025-01-01T00:00:00Z")];

    let mut datapack = query(ModType::Datapack, Some("1.21.5"));
    datapack.loader = Loader::Forge;
    assert!(select_release(&releases, &datapack).is_some());

    let mut as_mod = query(ModType::Mod, Some("1.21.5"));
    as_mod.loader = Loader::Forge;
    assert!(select_release(&releases, &as_mod).is_none());
}

#[test]
fn test_candidates_without_game_versions_match_any() {
    let releases = vec![candidate("3.0", &[], &[], "2025-01-01T00:00:00Z")];
    assert!(select_release(&releases, &query(ModType::Mod, Some("1.21.5"))).is_some());
}

#[test]
fn test_stable_preferred_over_newer_prerelease() {
    let mut beta = candidate("2.0.0-beta.1", &["1.21.5"], &["fabric"], "2025-09-01T00:00:00Z");
    beta.prerelease = true;
    let mut releases = sample();
    releases.push(beta.clone());

    let picked = select_release(&releases, &query(ModType::Mod, Some("1.21.5"))).unwrap();
    assert_eq!(picked.version, "1.2.0");

    // A prerelease is still better than nothing
    let only_beta = vec![beta];
    let picked = select_release(&only_beta, &query(ModType::Mod, None)).unwrap();
    assert_eq!(picked.version, "2.0.0-beta.1");
}

#[test]
fn test_same_publish_time_breaks_ties_by_version() {
    let releases = vec![
        candidate("1.9", &["1.21.5"], &[], "2025-01-01T00:00:00Z"),
        candidate("1.10", &["1.21.5"], &[], "2025-01-01T00:00:00Z"),
    ];
    let picked = select_release(&releases, &query(ModType::Mod, None)).unwrap();
    assert_eq!(picked.version, "1.10");
}

#[test]
fn test_pinned_version_and_latest_keyword() {
    let releases = sample();

    let pinned = query(ModType::Mod, None).with_version(Some("v1.0.0"));
    assert_eq!(select_release(&releases, &pinned).unwrap().version, "1.0.0");

    let mut beta = candidate("9.0.0-rc1", &["1.21.6"], &["fabric"], "2026-01-01T00:00:00Z");
    beta.prerelease = true;
    let mut with_beta = releases.clone();
    with_beta.push(beta);
    let latest = query(ModType::Mod, None).with_version(Some("latest"));
    assert_eq!(select_release(&with_beta, &latest).unwrap().version, "1.2.0");
}

#[test]
fn test_ceiling_excludes_newer_only_releases() {
    let releases = vec![
        candidate("1.0", &["1.21.4"], &[], "2025-01-01T00:00:00Z"),
        candidate("2.0", &["1.21.6"], &[], "2025-06-01T00:00:00Z"),
    ];
    let capped = query(ModType::Mod, None).with_ceiling(Some("1.21.5"));
    let resolved = resolve_from_candidates(ProviderKind::Modrinth, &releases, &capped).unwrap();
    assert_eq!(resolved.version, "1.0");
    assert_eq!(resolved.game_version, "1.21.4");
}

#[test]
fn test_resolve_reports_available_game_versions() {
    let resolved =
        resolve_from_candidates(ProviderKind::Modrinth, &sample(), &query(ModType::Mod, None)).unwrap();
    assert_eq!(resolved.version, "1.2.0");
    assert_eq!(resolved.game_version, "1.21.6");
    assert_eq!(resolved.available_game_versions, vec!["1.21.4", "1.21.5", "1.21.6"]);
}

#[test]
fn test_resolve_not_found_is_distinct() {
    let err = resolve_from_candidates(
        ProviderKind::Modrinth,
        &sample(),
        &query(ModType::Mod, Some("1.30")),
    )
    .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("game version 1.30"));
}

#[test]
fn test_networking_errors_map_to_transient_or_network() {
    let transient: ResolveError = NetworkingError::HttpStatus {
        status: 503,
        url: "https://x".to_string(),
    }
    .into();
    assert!(matches!(transient, ResolveError::Transient { .. }));

    let miss: ResolveError = NetworkingError::CacheMiss {
        key: "modrinth?id=x".to_string(),
    }
    .into();
    assert!(matches!(miss, ResolveError::Transient { .. }));

    let forbidden: ResolveError = NetworkingError::HttpStatus {
        status: 403,
        url: "https://x".to_string(),
    }
    .into();
    assert!(matches!(forbidden, ResolveError::Network { .. }));
}

#[test]
fn test_settings_base_url_override() {
    let mut settings = ProviderSettings::default();
    assert_eq!(settings.base_url(ProviderKind::Modrinth), "https://api.modrinth.com/v2");

    settings
        .base_urls
        .insert(ProviderKind::Modrinth, "http://127.0.0.1:1234/".to_string());
    assert_eq!(settings.base_url(ProviderKind::Modrinth), "http://127.0.0.1:1234");
}

#[test]
fn test_registry_requires_curseforge_key() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let networking = Arc::new(
        NetworkingManager::new(crate::networking::NetworkingConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap(),
    );

    let registry = ProviderRegistry::live(networking.clone(), &ProviderSettings::default());
    assert!(registry.ensure_configured([ProviderKind::Modrinth]).is_ok());
    assert!(matches!(
        registry.ensure_configured([ProviderKind::Modrinth, ProviderKind::CurseForge]),
        Err(ConfigError::MissingApiKey {
            provider: ProviderKind::CurseForge,
            ..
        })
    ));

    let keyed = ProviderRegistry::live(
        networking,
        &ProviderSettings {
            curseforge_api_key: Some("secret".to_string()),
            ..Default::default()
        },
    );
    assert!(keyed.ensure_configured([ProviderKind::CurseForge]).is_ok());
}

#[test]
fn test_registry_without_client_is_configuration_error() {
    let registry = ProviderRegistry::new();
    assert!(matches!(
        registry.get(ProviderKind::GitHub),
        Err(ResolveError::Configuration { .. })
    ));
}

#[test]
fn test_encode_query_values() {
    assert_eq!(encode("fabric-api"), "fabric-api");
    assert_eq!(encode("a b&c"), "a%20b%26c");
}
