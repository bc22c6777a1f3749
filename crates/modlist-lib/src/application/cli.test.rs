use super::*;
use std::path::PathBuf;

#[test]
fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = CliConfig::from_args([
        "modlist",
        "validate",
        "--database-file",
        "mods.csv",
        "--cached-only",
        "--next-game-version",
        "1.22",
    ])
    .unwrap();

    assert_eq!(cli.app_config.database_file, PathBuf::from("mods.csv"));
    assert!(cli.app_config.cached_only);
    match cli.command {
        Some(Commands::Validate(args)) => assert_eq!(args.next_game_version.as_deref(), Some("1.22")),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_add_arguments() {
    let cli = CliConfig::from_args([
        "modlist",
        "add",
        "jei",
        "--provider",
        "curse",
        "--type",
        "mod",
        "--loader",
        "forge",
        "--group",
        "optional",
    ])
    .unwrap();

    let Some(Commands::Add(args)) = cli.command else {
        panic!("expected add");
    };
    assert_eq!(args.source, "jei");
    assert_eq!(args.provider, Some(ProviderKind::CurseForge));
    assert_eq!(args.loader, Loader::Forge);
    assert_eq!(args.group, ModGroup::Optional);
}

#[test]
fn test_download_mods_slot() {
    let cli = CliConfig::from_args(["modlist", "download-mods", "--slot", "next", "--force"]).unwrap();
    let Some(Commands::DownloadMods(args)) = cli.command else {
        panic!("expected download-mods");
    };
    assert_eq!(args.slot, SlotKind::Next);
    assert!(args.force);
}

#[test]
fn test_start_server_java_args() {
    let cli = CliConfig::from_args([
        "modlist",
        "start-server",
        "--java-arg",
        "-Xmx4G",
        "--java-arg",
        "-Xms1G",
        "--accept-eula",
    ])
    .unwrap();
    let Some(Commands::StartServer(args)) = cli.command else {
        panic!("expected start-server");
    };
    assert_eq!(args.java_args, vec!["-Xmx4G", "-Xms1G"]);
    assert!(args.accept_eula);
    assert_eq!(args.timeout, 300);
    assert_eq!(args.success_pattern, "Done (");
}
