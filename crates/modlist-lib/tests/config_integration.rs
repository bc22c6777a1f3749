use modlist_lib::application::cli::CliConfig;
use modlist_lib::application::config::AppConfig;
use modlist_lib::networking::CacheMode;
use modlist_lib::primitives::{ProviderKind, TerminalCapsDetectIntent};
use std::path::PathBuf;

#[test]
fn test_config_default_creation() {
    let config = AppConfig::default();

    assert!(config.log_level <= 4);
    assert!(config.net_timeout > 0);
    assert_eq!(config.color, TerminalCapsDetectIntent::Auto);
    assert_eq!(config.database_file, PathBuf::from("modlist.csv"));
    assert_eq!(config.cache_mode(), CacheMode::Refresh);
}

#[test]
fn test_config_merging_integration() {
    let base_config = AppConfig::default();
    let override_config = AppConfig {
        log_level: 3,
        cached_only: true,
        color: TerminalCapsDetectIntent::Never,
        modrinth_api_base_url: Some("http://127.0.0.1:8080".to_string()),
        ..AppConfig::default()
    };

    let merged = base_config.merge_with(override_config);

    assert_eq!(merged.log_level, 3);
    assert_eq!(merged.color, TerminalCapsDetectIntent::Never);
    assert_eq!(merged.cache_mode(), CacheMode::CachedOnly);
    assert_eq!(
        merged.provider_settings().base_url(ProviderKind::Modrinth),
        "http://127.0.0.1:8080"
    );

    // Default values should remain for non-overridden fields
    assert_eq!(merged.net_timeout, 30);
}

#[test]
fn test_flags_reach_app_config() {
    let config = CliConfig::from_args([
        "modlist",
        "--use-cached-responses",
        "--download-folder",
        "jars",
        "download-mods",
    ])
    .unwrap();

    assert_eq!(config.app_config.cache_mode(), CacheMode::ReadThrough);
    assert_eq!(config.app_config.download_folder, PathBuf::from("jars"));
    assert!(config.command.is_some());
}
