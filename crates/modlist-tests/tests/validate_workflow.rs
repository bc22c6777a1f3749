//! E2E tests for validate and update
//!
//! Live provider clients run against a mockito server; the database, the
//! response cache and the downloads live in a temporary directory.

use anyhow::Result;
use mockito::{Matcher, Server};
use modlist_lib::application::cli::{Commands, ReconcileArgs};
use modlist_lib::application::commands::execute_command_with_session;
use modlist_tests::TestEnvironment;
use modlist_tests::fixtures::{SAMPLE_DATABASE, fabric_api_versions, sodium_versions};

#[tokio::test]
async fn e2e_validate_fills_next_and_keeps_user_columns() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;

    let mut server = Server::new_async().await;
    let cdn = format!("{}/cdn", server.url());
    let fabric_api = server
        .mock("GET", "/project/fabric-api/version")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fabric_api_versions(&cdn))
        .expect(1)
        .create_async()
        .await;
    let sodium = server
        .mock("GET", "/project/sodium/version")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(sodium_versions(&cdn))
        .expect(1)
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await?;

    fabric_api.assert_async().await;
    sodium.assert_async().await;

    let database = env.read_database()?;
    assert_eq!(database.len(), 3);

    let fabric_api = database.find("fabric-api").expect("fabric-api row");
    assert_eq!(fabric_api.current.version, "0.127.1+1.21.5");
    assert_eq!(fabric_api.next.version, "0.128.1+1.21.6");
    assert_eq!(fabric_api.next.game_version, "1.21.6");
    assert_eq!(fabric_api.latest.version, "0.128.1+1.21.6");
    assert!(fabric_api.current.url.ends_with("fabric-api-0.127.1+1.21.5.jar"));
    assert_eq!(
        fabric_api.extras.get("Notes").map(String::as_str),
        Some("core library")
    );

    // Sodium has nothing for 1.21.6
    let sodium = database.find("sodium").expect("sodium row");
    assert_eq!(sodium.current.version, "mc1.21.5-0.6.13-fabric");
    assert!(sodium.next.version.is_empty());

    let old_mod = database.find("old-mod").expect("old-mod row");
    assert_eq!(old_mod.current.version, "1.0");
    assert_eq!(old_mod.extras.get("Notes").map(String::as_str), Some("do not load"));

    Ok(())
}

#[tokio::test]
async fn e2e_update_moves_current_forward() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(
        "ID,Type,Loader,CurrentGameVersion,CurrentVersion,ApiSource\n\
         fabric-api,mod,fabric,1.21.6,0.127.9+1.21.6,modrinth\n",
    )?;

    let mut server = Server::new_async().await;
    let cdn = format!("{}/cdn", server.url());
    server
        .mock("GET", "/project/fabric-api/version")
        .with_status(200)
        .with_body(fabric_api_versions(&cdn))
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    execute_command_with_session(Commands::Update(ReconcileArgs::default()), &session).await?;

    let database = env.read_database()?;
    let record = database.find("fabric-api").expect("fabric-api row");
    assert_eq!(record.current.version, "0.128.1+1.21.6");
    assert_eq!(record.jar, "fabric-api-0.128.1+1.21.6.jar");

    Ok(())
}

#[tokio::test]
async fn e2e_provider_outage_leaves_rows_untouched() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;

    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Regex("^/project/.*".to_string()))
        .with_status(503)
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await?;

    let database = env.read_database()?;
    let fabric_api = database.find("fabric-api").expect("fabric-api row");
    assert_eq!(fabric_api.current.version, "0.127.1+1.21.5");
    assert!(fabric_api.next.version.is_empty());
    assert_eq!(database.len(), 3);

    Ok(())
}

#[tokio::test]
async fn e2e_cached_only_replays_recorded_responses() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_database(SAMPLE_DATABASE)?;

    let mut server = Server::new_async().await;
    let cdn = format!("{}/cdn", server.url());
    let fabric_api = server
        .mock("GET", "/project/fabric-api/version")
        .with_status(200)
        .with_body(fabric_api_versions(&cdn))
        .expect(1)
        .create_async()
        .await;
    let sodium = server
        .mock("GET", "/project/sodium/version")
        .with_status(200)
        .with_body(sodium_versions(&cdn))
        .expect(1)
        .create_async()
        .await;

    let session = env.session(&server.url())?;
    execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await?;
    let recorded = env.database_text()?;

    // Replay without a reachable provider
    env.write_database(SAMPLE_DATABASE)?;
    let mut config = env.config("http://127.0.0.1:9");
    config.cached_only = true;
    let session = env.session_with(config)?;
    execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await?;

    fabric_api.assert_async().await;
    sodium.assert_async().await;
    assert_eq!(env.database_text()?, recorded);

    Ok(())
}

#[tokio::test]
async fn e2e_missing_database_is_fatal() -> Result<()> {
    let env = TestEnvironment::new()?;
    let server = Server::new_async().await;

    let session = env.session(&server.url())?;
    let result =
        execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await;

    assert!(result.is_err());
    assert!(!env.database_path.exists());
    Ok(())
}

#[tokio::test]
async fn e2e_missing_curseforge_key_aborts_before_writing() -> Result<()> {
    let env = TestEnvironment::new()?;
    let text = "ID,Type,Loader,CurrentGameVersion,CurrentVersion,ApiSource\n\
                jei,mod,fabric,1.21.5,19.0.0,curseforge\n";
    env.write_database(text)?;

    let server = Server::new_async().await;
    let session = env.session(&server.url())?;
    let result =
        execute_command_with_session(Commands::Validate(ReconcileArgs::default()), &session).await;

    assert!(result.is_err());
    assert_eq!(env.database_text()?, text);
    Ok(())
}
