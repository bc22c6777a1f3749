use super::*;

#[test]
fn test_parse_names_and_aliases() {
    assert_eq!("modrinth".parse::<ProviderKind>().unwrap(), ProviderKind::Modrinth);
    assert_eq!("CurseForge".parse::<ProviderKind>().unwrap(), ProviderKind::CurseForge);
    assert_eq!("curse".parse::<ProviderKind>().unwrap(), ProviderKind::CurseForge);
    assert_eq!("GitHub".parse::<ProviderKind>().unwrap(), ProviderKind::GitHub);
    assert_eq!(" direct ".parse::<ProviderKind>().unwrap(), ProviderKind::Direct);
    assert!("forge".parse::<ProviderKind>().is_err());
}

#[test]
fn test_display_round_trips() {
    for provider in ProviderKind::value_variants() {
        let parsed: ProviderKind = provider.to_string().parse().unwrap();
        assert_eq!(parsed, *provider);
    }
}

#[test]
fn test_api_keys() {
    assert!(ProviderKind::CurseForge.requires_api_key());
    assert!(!ProviderKind::Modrinth.requires_api_key());
    assert!(!ProviderKind::GitHub.requires_api_key());
    assert_eq!(
        ProviderKind::CurseForge.api_key_env_var(),
        Some("CURSEFORGE_API_KEY")
    );
    assert_eq!(ProviderKind::Modrinth.api_key_env_var(), None);
}

#[test]
fn test_base_urls_have_no_trailing_slash() {
    assert!(!ProviderKind::Modrinth.api_base_url().ends_with('/'));
    assert_eq!(ProviderKind::Direct.api_base_url(), "");
}

#[test]
fn test_curseforge_is_serialized() {
    assert_eq!(ProviderKind::CurseForge.max_concurrent_requests(), 1);
    assert!(ProviderKind::Modrinth.max_concurrent_requests() > 1);
}

#[test]
fn test_from_url() {
    assert_eq!(
        ProviderKind::from_url("https://modrinth.com/mod/sodium"),
        ProviderKind::Modrinth
    );
    assert_eq!(
        ProviderKind::from_url("https://cdn.modrinth.com/data/AANobbMI/versions/x/sodium.jar"),
        ProviderKind::Modrinth
    );
    assert_eq!(
        ProviderKind::from_url("https://www.curseforge.com/minecraft/mc-mods/jei"),
        ProviderKind::CurseForge
    );
    assert_eq!(
        ProviderKind::from_url("https://github.com/owner/mod-bigger-ender-chests"),
        ProviderKind::GitHub
    );
    assert_eq!(
        ProviderKind::from_url("https://piston-data.mojang.com/v1/objects/abc/server.jar"),
        ProviderKind::Mojang
    );
    assert_eq!(
        ProviderKind::from_url("https://meta.fabricmc.net/v2/versions/installer"),
        ProviderKind::Fabric
    );
    assert_eq!(
        ProviderKind::from_url("https://notmodrinth.com/mod/x"),
        ProviderKind::Direct
    );
    assert_eq!(ProviderKind::from_url(""), ProviderKind::Direct);
}

#[test]
fn test_url_host() {
    assert_eq!(url_host("https://User@Example.com:8080/path?q=1"), "example.com");
    assert_eq!(url_host("github.com/owner/repo"), "github.com");
    assert_eq!(url_host(""), "");
}

#[test]
fn test_serialization() {
    let json = serde_json::to_string(&ProviderKind::CurseForge).unwrap();
    assert_eq!(json, "\"curseforge\"");
    let back: ProviderKind = serde_json::from_str("\"github\"").unwrap();
    assert_eq!(back, ProviderKind::GitHub);
}
