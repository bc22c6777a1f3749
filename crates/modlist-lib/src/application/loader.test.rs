use super::*;
use crate::primitives::TerminalCapsDetectIntent;
use std::path::PathBuf;

#[test]
fn test_layered_precedence() {
    let environment = EnvironmentConfig {
        no_color: Some("1".to_string()),
        curseforge_api_key: Some("env-key".to_string()),
        ..EnvironmentConfig::default()
    };
    let cli = CliConfig::from_args(["modlist", "--database-file", "mods.csv", "list"])
        .unwrap()
        .app_config;

    let config = AppConfig::layered(&environment, cli).unwrap();
    assert_eq!(config.database_file, PathBuf::from("mods.csv"));
    assert_eq!(config.color, TerminalCapsDetectIntent::Never);
    assert_eq!(config.curseforge_api_key.as_deref(), Some("env-key"));
    assert!(config.api_response_folder.is_some());
}

#[test]
fn test_cli_overrides_environment() {
    let environment = EnvironmentConfig {
        no_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };
    let cli = AppConfig {
        color: TerminalCapsDetectIntent::Always,
        curseforge_api_key: Some("flag-key".to_string()),
        ..AppConfig::default()
    };

    let config = AppConfig::layered(&environment, cli).unwrap();
    assert_eq!(config.color, TerminalCapsDetectIntent::Always);
    assert_eq!(config.curseforge_api_key.as_deref(), Some("flag-key"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let cli = AppConfig {
        net_timeout: 0,
        ..AppConfig::default()
    };
    assert!(AppConfig::layered(&EnvironmentConfig::default(), cli).is_err());
}
