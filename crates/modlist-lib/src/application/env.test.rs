use super::*;

fn color(env: EnvironmentConfig) -> TerminalCapsDetectIntent {
    env.apply_color_config(TerminalCapsDetectIntent::Auto)
}

#[test]
fn test_no_color_disables_color() {
    let env = EnvironmentConfig {
        no_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };
    assert_eq!(color(env), TerminalCapsDetectIntent::Never);
}

#[test]
fn test_empty_no_color_is_ignored() {
    let env = EnvironmentConfig {
        no_color: Some(String::new()),
        ..EnvironmentConfig::default()
    };
    assert_eq!(color(env), TerminalCapsDetectIntent::Auto);
}

#[test]
fn test_force_color_wins_over_no_color() {
    let env = EnvironmentConfig {
        clicolor: Some("0".to_string()),
        no_color: Some("1".to_string()),
        force_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };
    assert_eq!(color(env), TerminalCapsDetectIntent::Always);
}

#[test]
fn test_ci_disables_color() {
    let env = EnvironmentConfig {
        ci: Some("true".to_string()),
        force_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };
    assert_eq!(color(env), TerminalCapsDetectIntent::Never);
}

#[test]
fn test_invalid_force_color_values_ignored() {
    let env = EnvironmentConfig {
        force_color: Some("invalid".to_string()),
        ..EnvironmentConfig::default()
    };
    assert_eq!(color(env), TerminalCapsDetectIntent::Auto);
}

#[test]
fn test_provider_variables_fill_gaps_only() {
    let env = EnvironmentConfig {
        curseforge_api_key: Some("env-key".to_string()),
        github_token: Some("env-token".to_string()),
        modrinth_api_base_url: Some("http://localhost:9000".to_string()),
        fabric_api_base_url: Some(" ".to_string()),
        ..EnvironmentConfig::default()
    };
    let mut config = AppConfig {
        github_token: Some("flag-token".to_string()),
        ..AppConfig::default()
    };

    env.apply_provider_config(&mut config);
    assert_eq!(config.curseforge_api_key.as_deref(), Some("env-key"));
    assert_eq!(config.github_token.as_deref(), Some("flag-token"));
    assert_eq!(config.modrinth_api_base_url.as_deref(), Some("http://localhost:9000"));
    assert_eq!(config.fabric_api_base_url, None);
}
