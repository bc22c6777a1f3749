use super::*;

fn env(term: Option<&str>, colorterm: Option<&str>, lang: Option<&str>) -> TerminalEnvConfig {
    TerminalEnvConfig {
        term: term.map(str::to_string),
        colorterm: colorterm.map(str::to_string),
        lang: lang.map(str::to_string),
        lc_all: None,
    }
}

#[test]
fn test_truecolor_from_colorterm() {
    let caps = color_from_env(&env(Some("xterm"), Some("truecolor"), None));
    assert_eq!(caps, TerminalColorCaps::TrueColor);
}

#[test]
fn test_256_color_term() {
    let caps = color_from_env(&env(Some("xterm-256color"), None, None));
    assert_eq!(caps, TerminalColorCaps::Ansi256);
}

#[test]
fn test_dumb_terminal_has_no_color() {
    assert_eq!(
        color_from_env(&env(Some("dumb"), None, None)),
        TerminalColorCaps::None
    );
    assert_eq!(color_from_env(&env(None, None, None)), TerminalColorCaps::None);
}

#[test]
fn test_forced_color_has_floor() {
    assert_eq!(
        TerminalColorCaps::None.max_with(TerminalColorCaps::Ansi16),
        TerminalColorCaps::Ansi16
    );
    assert_eq!(
        TerminalColorCaps::TrueColor.max_with(TerminalColorCaps::Ansi16),
        TerminalColorCaps::TrueColor
    );
}

#[test]
fn test_unicode_from_locale() {
    assert!(unicode_from_env(&env(None, None, Some("en_US.UTF-8"))));
    assert!(!unicode_from_env(&env(None, None, Some("C"))));
}

#[test]
fn test_never_intent_disables_color() {
    let config = AppConfig {
        color: TerminalCapsDetectIntent::Never,
        ..AppConfig::default()
    };
    let caps = TerminalCapabilities::detect_from_config(&config).unwrap();
    assert!(!caps.supports_color());
}

#[test]
fn test_minimal_capabilities() {
    let caps = TerminalCapabilities::minimal();
    assert!(!caps.supports_color());
    assert!(!caps.unicode);
    assert_eq!(caps.cols, 80);
}
