use super::*;

#[test]
fn test_group_parse() {
    assert_eq!("required".parse::<ModGroup>().unwrap(), ModGroup::Required);
    assert_eq!("Optional".parse::<ModGroup>().unwrap(), ModGroup::Optional);
    assert_eq!("blocked".parse::<ModGroup>().unwrap(), ModGroup::Block);
    assert!("sometimes".parse::<ModGroup>().is_err());
    assert_eq!(ModGroup::default(), ModGroup::Required);
}

#[test]
fn test_type_parse_and_display() {
    for mod_type in ModType::value_variants() {
        let parsed: ModType = mod_type.to_string().parse().unwrap();
        assert_eq!(parsed, *mod_type);
    }
    assert_eq!("shaderpack".parse::<ModType>().unwrap(), ModType::Shader);
    assert_eq!("resource-pack".parse::<ModType>().unwrap(), ModType::Resourcepack);
}

#[test]
fn test_infrastructure_types() {
    assert!(ModType::Server.is_infrastructure());
    assert!(ModType::Launcher.is_infrastructure());
    assert!(ModType::Installer.is_infrastructure());
    assert!(!ModType::Mod.is_infrastructure());
    assert!(!ModType::Datapack.is_infrastructure());
}

#[test]
fn test_loader_specific_types() {
    assert!(ModType::Mod.is_loader_specific());
    assert!(!ModType::Datapack.is_loader_specific());
    assert!(!ModType::Shader.is_loader_specific());
}

#[test]
fn test_repo_name_inference() {
    assert_eq!(ModType::from_repo_name("mod-bigger-ender-chests"), ModType::Mod);
    assert_eq!(ModType::from_repo_name("shader-x"), ModType::Shader);
    assert_eq!(ModType::from_repo_name("owner/datapack-trees"), ModType::Datapack);
    assert_eq!(
        ModType::from_repo_name("ResourcePack-Faithful"),
        ModType::Resourcepack
    );
    assert_eq!(ModType::from_repo_name("plugin-essentials"), ModType::Plugin);
    assert_eq!(ModType::from_repo_name("modmenu"), ModType::Mod);
}

#[test]
fn test_download_folders() {
    assert_eq!(ModType::Mod.download_folder(), Some("mods"));
    assert_eq!(ModType::Shader.download_folder(), Some("shaderpacks"));
    assert_eq!(ModType::Server.download_folder(), None);
}

#[test]
fn test_loader_round_trip_preserves_unknown() {
    assert_eq!(Loader::parse("Fabric"), Loader::Fabric);
    assert_eq!(Loader::parse("neoforge"), Loader::NeoForge);
    assert_eq!(Loader::parse(""), Loader::Unspecified);
    assert_eq!(Loader::parse("  "), Loader::Unspecified);
    assert!(Loader::Unspecified.matches("quilt"));
    assert_eq!(Loader::Unspecified.to_string(), "");
    let custom = Loader::parse("iris");
    assert_eq!(custom, Loader::Other("iris".to_string()));
    assert_eq!(custom.to_string(), "iris");
}

#[test]
fn test_loader_matches_is_case_insensitive() {
    assert!(Loader::Fabric.matches("Fabric"));
    assert!(!Loader::Forge.matches("neoforge"));
}

#[test]
fn test_slot_kind_parse() {
    assert_eq!("next".parse::<SlotKind>().unwrap(), SlotKind::Next);
    assert_eq!(SlotKind::Latest.to_string(), "latest");
}
