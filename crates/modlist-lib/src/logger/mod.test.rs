use super::*;

#[test]
fn test_filter_directives_scope_our_crates() {
    let directives = filter_directives(LogLevel::Debug);
    assert!(directives.starts_with("debug,"));
    assert!(directives.contains("modlist_lib=debug"));
    assert!(directives.contains("modlist=debug"));
    assert!(directives.contains("reqwest=warn"));
    assert!(directives.contains("hyper_util=warn"));
}

#[test]
fn test_filter_directives_quiet_levels_pass_through() {
    let directives = filter_directives(LogLevel::Error);
    assert!(directives.contains("reqwest=error"));
    assert!(directives.contains("modlist_lib=error"));
}

#[test]
fn test_filter_directives_parse() {
    for level in [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ] {
        assert!(EnvFilter::try_new(filter_directives(level)).is_ok());
    }
}

#[test]
fn test_logger_global_consistent_with_initialized() {
    assert_eq!(Logger::is_initialized(), Logger::global().is_some());
}
