//! E2E tests for add, remove, list and the download commands

use anyhow::Result;
use mockito::{Matcher, Server};
use modlist_lib::application::cli::{AddArgs, Commands, DownloadArgs, ReconcileArgs};
use modlist_lib::application::commands::execute_command_with_session;
use modlist_lib::primitives::{ModGroup, ProviderKind, SlotKind};
use modlist_tests::TestEnvironment;
use modlist_tests::fixtures::{SAMPLE_DATABASE, fabric_api_versions, modrinth_project, sodium_versions};

#[tokio::test]
async fn e2e_add_from_modrinth_url() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(
        "ID,Type,Loader,CurrentGameVersion,CurrentVersion,ApiSource\n\
         fabric-api,mod,fabric,1.21.5,0.127.1+1.21.5,modrinth\n",
    )?;

    let mut server = Server::new_async().await;
    let cdn = format!("{}/cdn", server.url());
    server
        .mock("GET", "/project/sodium")
        .with_status(200)
        .with_body(modrinth_project("AANobbMI", "sodium", "Sodium"))
        .create_async()
        .await;
    server
        .mock("GET", "/project/sodium/version")
        .with_status(200)
        .with_body(sodium_versions(&cdn))
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    let args = AddArgs {
        source: "https://modrinth.com/mod/sodium".to_string(),
        group: ModGroup::Optional,
        ..AddArgs::default()
    };
    execute_command_with_session(Commands::Add(args), &session).await?;

    let database = env.read_database()?;
    assert_eq!(database.len(), 2);
    let sodium = database.find("sodium").expect("sodium row");
    assert_eq!(sodium.name, "Sodium");
    assert_eq!(sodium.group, ModGroup::Optional);
    assert_eq!(sodium.provider, ProviderKind::Modrinth);
    // Majority game version of the existing rows
    assert_eq!(sodium.current.game_version, "1.21.5");
    assert_eq!(sodium.current.version, "mc1.21.5-0.6.13-fabric");
    assert_eq!(sodium.jar, "sodium-fabric-0.6.13+mc1.21.5.jar");

    Ok(())
}

#[tokio::test]
async fn e2e_add_unknown_project_leaves_database_alone() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;

    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Regex("^/project/.*".to_string()))
        .with_status(404)
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    let args = AddArgs {
        source: "https://modrinth.com/mod/does-not-exist".to_string(),
        ..AddArgs::default()
    };
    let result = execute_command_with_session(Commands::Add(args), &session).await;

    assert!(result.is_err());
    assert_eq!(env.database_text()?, SAMPLE_DATABASE);
    Ok(())
}

#[tokio::test]
async fn e2e_remove_keeps_rows_and_columns() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;
    let server = Server::new_async().await;
    let session = env.session(&server.url())?;

    let remove = Commands::Remove {
        id: "sodium".to_string(),
        mod_type: None,
        loader: None,
    };
    execute_command_with_session(remove, &session).await?;

    let database = env.read_database()?;
    assert_eq!(database.len(), 2);
    assert!(database.find("sodium").is_none());
    assert!(database.headers().iter().any(|h| h == "Notes"));
    let fabric_api = database.find("fabric-api").expect("fabric-api row");
    assert_eq!(
        fabric_api.extras.get("Notes").map(String::as_str),
        Some("core library")
    );

    Ok(())
}

#[tokio::test]
async fn e2e_list_is_read_only() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;
    let server = Server::new_async().await;
    let session = env.session(&server.url())?;

    let list = Commands::List {
        group: None,
        mod_type: None,
    };
    execute_command_with_session(list, &session).await?;

    assert_eq!(env.database_text()?, SAMPLE_DATABASE);
    Ok(())
}

#[tokio::test]
async fn e2e_download_validates_then_fetches_jars() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;

    let mut server = Server::new_async().await;
    let cdn = format!("{}/cdn", server.url());
    server
        .mock("GET", "/project/fabric-api/version")
        .with_status(200)
        .with_body(fabric_api_versions(&cdn))
        .create_async()
        .await;
    server
        .mock("GET", "/project/sodium/version")
        .with_status(200)
        .with_body(sodium_versions(&cdn))
        .create_async()
        .await;
    let jars = server
        .mock("GET", Matcher::Regex(r"^/cdn/.*\.jar$".to_string()))
        .with_status(200)
        .with_body("jar bytes")
        .expect(2)
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    let command = Commands::Download {
        reconcile: ReconcileArgs::default(),
        download: DownloadArgs {
            slot: SlotKind::Current,
            force: false,
        },
    };
    execute_command_with_session(command, &session).await?;

    jars.assert_async().await;
    let mods = env.download_path.join("1.21.5").join("mods");
    assert_eq!(
        std::fs::read_to_string(mods.join("fabric-api-0.127.1+1.21.5.jar"))?,
        "jar bytes"
    );
    assert!(mods.join("sodium-fabric-0.6.13+mc1.21.5.jar").exists());
    // Blocked rows are never downloaded
    assert!(!mods.join("old-mod.jar").exists());

    Ok(())
}

#[tokio::test]
async fn e2e_download_mods_skips_existing_files() -> Result<()> {
    let env = TestEnvironment::new()?;
    let mut server = Server::new_async().await;
    let url = format!("{}/files/lithium.jar", server.url());
    env.write_database(&format!(
        "ID,Type,Loader,CurrentGameVersion,CurrentVersion,CurrentVersionUrl,Jar,ApiSource\n\
         lithium,mod,fabric,1.21.5,0.16.0,{url},lithium.jar,direct\n"
    ))?;

    let file = server
        .mock("GET", "/files/lithium.jar")
        .with_status(200)
        .with_body("lithium")
        .expect(1)
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    let args = DownloadArgs {
        slot: SlotKind::Current,
        force: false,
    };
    execute_command_with_session(Commands::DownloadMods(args.clone()), &session).await?;
    execute_command_with_session(Commands::DownloadMods(args), &session).await?;

    file.assert_async().await;
    assert!(env.download_path.join("1.21.5/mods/lithium.jar").exists());
    Ok(())
}
