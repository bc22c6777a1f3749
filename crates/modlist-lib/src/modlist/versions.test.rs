use super::*;
use crate::primitives::{Loader, ModType};

fn record(mod_type: ModType, game_version: &str) -> ModRecord {
    let mut record = ModRecord::new("test", mod_type, Loader::Fabric);
    record.current.game_version = game_version.to_string();
    record
}

#[test]
fn test_numeric_fields_compare_as_integers() {
    assert_eq!(compare_versions("1.21.10", "1.21.9"), Ordering::Greater);
    assert_eq!(compare_versions("1.2", "1.10"), Ordering::Less);
    assert_eq!(compare_versions("1.21", "1.21.0"), Ordering::Equal);
}

#[test]
fn test_suffix_ranks_below_bare_release() {
    assert_eq!(compare_versions("1.0.0", "1.0.0-beta"), Ordering::Greater);
    assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Less);
    assert_eq!(compare_versions("1.0.0-beta.2", "1.0.0-beta.10"), Ordering::Less);
    assert_eq!(compare_versions("1.0.0-alpha", "1.0.0-beta"), Ordering::Less);
}

#[test]
fn test_build_metadata_versions() {
    assert_eq!(
        compare_versions("0.127.1+1.21.5", "0.128.0+1.21.5"),
        Ordering::Less
    );
    assert_eq!(
        compare_versions("0.127.1+1.21.6", "0.127.1+1.21.5"),
        Ordering::Greater
    );
}

#[test]
fn test_v_prefix_is_ignored() {
    assert_eq!(compare_versions("v1.2.3", "1.2.3"), Ordering::Equal);
    assert_eq!(compare_versions("V2", "v1.9"), Ordering::Greater);
}

#[test]
fn test_empty_sorts_lowest() {
    assert_eq!(compare_versions("", ""), Ordering::Equal);
    assert_eq!(compare_versions("", "0"), Ordering::Less);
    assert_eq!(compare_versions("  ", "abc"), Ordering::Less);
    assert_eq!(compare_versions("abc", ""), Ordering::Greater);
}

#[test]
fn test_malformed_input_falls_back_to_lexicographic() {
    assert_eq!(compare_versions("abc", "abd"), Ordering::Less);
    assert_eq!(compare_versions("1.0", "release"), "1.0".cmp("release"));
    let huge = "99999999999999999999999.1";
    assert_eq!(compare_versions(huge, "1.0"), huge.cmp("1.0"));
    assert_eq!(compare_versions("...", "-+-"), "...".cmp("-+-"));
}

#[test]
fn test_release_version_detection() {
    assert!(is_release_version("1.21.5"));
    assert!(is_release_version("1.21"));
    assert!(!is_release_version("25w14a"));
    assert!(!is_release_version("1.21-pre1"));
    assert!(!is_release_version("1"));
    assert!(!is_release_version(""));
}

#[test]
fn test_highest_version() {
    assert_eq!(
        highest_version(["1.21.4", "", "1.21.10", "1.21.5"]).as_deref(),
        Some("1.21.10")
    );
    assert_eq!(highest_version(Vec::<&str>::new()), None);
    assert_eq!(highest_version([""]), None);
}

#[test]
fn test_sort_versions_dedups() {
    let sorted = sort_versions(vec![
        "1.21.5".to_string(),
        "1.20.1".to_string(),
        "".to_string(),
        "1.21.5".to_string(),
        "1.21.10".to_string(),
    ]);
    assert_eq!(sorted, vec!["1.20.1", "1.21.5", "1.21.10"]);
}

#[test]
fn test_majority_game_version() {
    let records = vec![
        record(ModType::Mod, "1.21.5"),
        record(ModType::Mod, "1.21.5"),
        record(ModType::Mod, "1.21.6"),
    ];
    assert_eq!(majority_game_version(&records).as_deref(), Some("1.21.5"));
}

#[test]
fn test_majority_tie_prefers_higher_version() {
    let records = vec![
        record(ModType::Mod, "1.21.4"),
        record(ModType::Shader, "1.21.10"),
    ];
    assert_eq!(majority_game_version(&records).as_deref(), Some("1.21.10"));
}

#[test]
fn test_majority_ignores_infrastructure() {
    let records = vec![
        record(ModType::Server, "1.21.6"),
        record(ModType::Launcher, "1.21.6"),
        record(ModType::Installer, "1.21.6"),
        record(ModType::Mod, "1.21.5"),
    ];
    assert_eq!(majority_game_version(&records).as_deref(), Some("1.21.5"));

    let only_infrastructure = vec![record(ModType::Server, "1.21.6")];
    assert_eq!(majority_game_version(&only_infrastructure), None);
}

#[test]
fn test_empty_database_yields_none() {
    assert_eq!(majority_game_version(&[]), None);
    assert_eq!(latest_game_version(&[]), None);
    assert_eq!(next_game_version(""), None);
}

#[test]
fn test_next_game_version() {
    assert_eq!(next_game_version("1.21.5").as_deref(), Some("1.21.6"));
    assert_eq!(next_game_version("1.21.9").as_deref(), Some("1.21.10"));
    assert_eq!(next_game_version("1.21").as_deref(), Some("1.21.1"));
    assert_eq!(next_game_version("1.21.x"), None);
    assert_eq!(next_game_version("25w14a"), None);
}

#[test]
fn test_latest_game_version_falls_back_to_current() {
    let mut ahead = record(ModType::Mod, "1.21.5");
    ahead.latest.game_version = "1.21.8".to_string();
    let records = vec![
        ahead,
        record(ModType::Mod, "1.21.6"),
        record(ModType::Server, "1.22"),
    ];
    assert_eq!(latest_game_version(&records).as_deref(), Some("1.21.8"));
}
