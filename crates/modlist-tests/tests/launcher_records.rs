//! E2E tests for launcher and server rows
//!
//! Uses mock providers so the Fabric and Mojang catalogues can be shaped
//! per test.

use anyhow::Result;
use modlist_lib::api::{MockVersionProvider, ProviderRegistry, ResolvedVersion};
use modlist_lib::application::cli::{Commands, ReconcileArgs, ServerArgs};
use modlist_lib::application::commands::execute_command_with_session;
use modlist_lib::application::session::CommandSession;
use modlist_lib::primitives::ProviderKind;
use modlist_tests::TestEnvironment;
use std::sync::Arc;

const SERVER_DATABASE: &str = "\
Group,Type,ID,Loader,CurrentGameVersion,CurrentVersion,Jar,ApiSource
required,launcher,fabric-server,fabric,1.21.5,0.16.10,,fabric
required,server,minecraft-server,vanilla,1.21.5,1.21.5,,mojang
";

fn release(version: &str, game_version: &str, url: &str, jar: &str) -> ResolvedVersion {
    ResolvedVersion {
        version: version.to_string(),
        download_url: url.to_string(),
        jar_filename: jar.to_string(),
        game_version: game_version.to_string(),
        available_game_versions: vec!["1.21.5".to_string(), "1.21.6".to_string()],
        ..ResolvedVersion::default()
    }
}

fn registry() -> ProviderRegistry {
    let launcher = "https://meta.fabricmc.net/v2/versions/loader/1.21.5/0.16.14/1.0.3/server/jar";
    let fabric = MockVersionProvider::new(ProviderKind::Fabric)
        .with_version(
            "fabric-server",
            Some("1.21.5"),
            release("0.16.14", "1.21.5", launcher, "fabric-server-mc.1.21.5-loader.0.16.14-launcher.1.0.3.jar"),
        )
        .with_version(
            "fabric-server",
            None,
            release("0.16.14", "1.21.6", launcher, "fabric-server-launch.jar"),
        );

    let server_jar = "https://piston-data.mojang.com/v1/objects/abc/server.jar";
    let mojang = MockVersionProvider::new(ProviderKind::Mojang)
        .with_version(
            "minecraft-server",
            Some("1.21.5"),
            release("1.21.5", "1.21.5", server_jar, "minecraft_server.1.21.5.jar"),
        )
        .with_version(
            "minecraft-server",
            Some("1.21.6"),
            release("1.21.6", "1.21.6", server_jar, "minecraft_server.1.21.6.jar"),
        )
        .with_version(
            "minecraft-server",
            None,
            release("1.21.6", "1.21.6", server_jar, "minecraft_server.1.21.6.jar"),
        );

    ProviderRegistry::new()
        .with_provider(Arc::new(fabric))
        .with_provider(Arc::new(mojang))
}

fn session(env: &TestEnvironment) -> Result<CommandSession> {
    CommandSession::with_registry(env.config("http://127.0.0.1:9"), registry())
}

#[tokio::test]
async fn e2e_update_moves_launcher_and_fills_server() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SERVER_DATABASE)?;
    let session = session(&env)?;

    execute_command_with_session(Commands::Update(ReconcileArgs::default()), &session).await?;

    let database = env.read_database()?;
    let launcher = database.find("fabric-server").expect("launcher row");
    assert_eq!(launcher.current.version, "0.16.14");
    assert_eq!(launcher.jar, "fabric-server-mc.1.21.5-loader.0.16.14-launcher.1.0.3.jar");
    // No Fabric build registered for 1.21.6
    assert!(launcher.next.version.is_empty());

    let server = database.find("minecraft-server").expect("server row");
    assert_eq!(server.current.version, "1.21.5");
    assert_eq!(server.jar, "minecraft_server.1.21.5.jar");
    assert_eq!(server.next.version, "1.21.6");
    assert_eq!(server.latest.version, "1.21.6");

    Ok(())
}

#[tokio::test]
async fn e2e_start_server_needs_the_download_folder() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SERVER_DATABASE)?;
    let session = session(&env)?;

    let args = ServerArgs {
        jar: Some("server.jar".to_string()),
        timeout: 1,
        ..ServerArgs::default()
    };
    let result = execute_command_with_session(Commands::StartServer(args), &session).await;

    assert!(result.is_err());
    assert_eq!(env.database_text()?, SERVER_DATABASE);
    Ok(())
}
