use super::*;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.database_file, PathBuf::from("modlist.csv"));
    assert_eq!(config.net_timeout, 30);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.log_level, 1);
    assert_eq!(config.cache_mode(), CacheMode::Refresh);
}

#[test]
fn test_cache_mode_from_switches() {
    let read_through = AppConfig {
        use_cached_responses: true,
        ..AppConfig::default()
    };
    assert_eq!(read_through.cache_mode(), CacheMode::ReadThrough);

    let offline = AppConfig {
        cached_only: true,
        ..AppConfig::default()
    };
    assert_eq!(offline.cache_mode(), CacheMode::CachedOnly);
}

#[test]
fn test_networking_config_follows_flags() {
    let config = AppConfig {
        net_timeout: 5,
        max_retries: 0,
        api_response_folder: Some(PathBuf::from("/tmp/responses")),
        cached_only: true,
        ..AppConfig::default()
    };

    let networking = config.networking_config();
    assert_eq!(networking.timeout_seconds, 5);
    assert_eq!(networking.max_retries, 0);
    assert_eq!(networking.cache_dir, PathBuf::from("/tmp/responses"));
    assert_eq!(networking.cache_mode, CacheMode::CachedOnly);
}

#[test]
fn test_provider_settings() {
    let config = AppConfig {
        modrinth_api_base_url: Some("http://127.0.0.1:1234/".to_string()),
        curseforge_api_key: Some("  ".to_string()),
        github_token: Some("ghp_x".to_string()),
        ..AppConfig::default()
    };

    let settings = config.provider_settings();
    assert_eq!(settings.base_url(ProviderKind::Modrinth), "http://127.0.0.1:1234");
    assert_eq!(settings.base_url(ProviderKind::Fabric), "https://meta.fabricmc.net");
    assert_eq!(settings.curseforge_api_key, None);
    assert_eq!(settings.github_token.as_deref(), Some("ghp_x"));
}

#[test]
fn test_config_merging() {
    let base = AppConfig {
        curseforge_api_key: Some("from-env".to_string()),
        ..AppConfig::default()
    };
    let cli = AppConfig {
        log_level: 4,
        color: TerminalCapsDetectIntent::Always,
        database_file: PathBuf::from("mods.csv"),
        cached_only: true,
        ..AppConfig::default()
    };

    let merged = base.merge_with(cli);
    assert_eq!(merged.log_level, 4);
    assert_eq!(merged.color, TerminalCapsDetectIntent::Always);
    assert_eq!(merged.database_file, PathBuf::from("mods.csv"));
    assert!(merged.cached_only);
    assert_eq!(merged.curseforge_api_key.as_deref(), Some("from-env"));
    assert_eq!(merged.net_timeout, 30);
}

#[test]
fn test_validate() {
    let mut config = AppConfig::default();
    config.validate().unwrap();
    assert!(config.api_response_folder.is_some());

    let mut zero_timeout = AppConfig {
        net_timeout: 0,
        ..AppConfig::default()
    };
    assert!(matches!(
        zero_timeout.validate(),
        Err(ConfigError::ValidationFailed { .. })
    ));
}
