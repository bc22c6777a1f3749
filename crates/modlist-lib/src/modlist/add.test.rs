use super::*;
use crate::api::{MockVersionProvider, ProjectMetadata, ResolvedVersion};
use crate::modlist::record::DependencyRef;
use std::sync::Arc;

const DATABASE: &str = "\
Group,Type,CurrentGameVersion,ID,Loader,CurrentVersion,ApiSource
required,mod,1.21.5,fabric-api,fabric,0.127.1+1.21.5,modrinth
required,mod,1.21.5,lithium,fabric,0.15.0,modrinth
optional,mod,1.21.4,old-mod,fabric,1.0.0,modrinth
";

fn sodium_metadata() -> ProjectMetadata {
    ProjectMetadata {
        id: "sodium".to_string(),
        name: "Sodium".to_string(),
        description: "Rendering engine".to_string(),
        url: "https://modrinth.com/mod/sodium".to_string(),
        mod_type: Some(ModType::Mod),
        ..ProjectMetadata::default()
    }
}

fn sodium_version() -> ResolvedVersion {
    ResolvedVersion {
        version: "0.6.14".to_string(),
        download_url: "https://cdn.modrinth.com/sodium-0.6.14.jar".to_string(),
        jar_filename: "sodium-0.6.14.jar".to_string(),
        game_version: "1.21.5".to_string(),
        dependencies: vec![DependencyRef {
            project_id: "P7dR8mSH".to_string(),
            file_id: None,
            required: true,
            host: ProviderKind::Modrinth,
        }],
        available_game_versions: vec!["1.21.4".to_string(), "1.21.5".to_string()],
        ..ResolvedVersion::default()
    }
}

fn registry() -> ProviderRegistry {
    ProviderRegistry::new().with_provider(Arc::new(
        MockVersionProvider::new(ProviderKind::Modrinth)
            .with_project("sodium", sodium_metadata())
            .with_version("sodium", Some("1.21.5"), sodium_version()),
    ))
}

fn database() -> Database {
    Database::from_reader(DATABASE.as_bytes()).unwrap()
}

#[test]
fn test_parse_project_urls() {
    let curse = parse_project_url("https://www.curseforge.com/minecraft/mc-mods/jei/files").unwrap();
    assert_eq!(curse.provider, ProviderKind::CurseForge);
    assert_eq!(curse.id, "jei");
    assert_eq!(curse.mod_type, Some(ModType::Mod));

    let shader = parse_project_url("https://modrinth.com/shader/complementary?tab=versions").unwrap();
    assert_eq!(shader.id, "complementary");
    assert_eq!(shader.mod_type, Some(ModType::Shader));

    let github = parse_project_url("https://github.com/FabricMC/fabric-installer.git").unwrap();
    assert_eq!(github.provider, ProviderKind::GitHub);
    assert_eq!(github.id, "FabricMC/fabric-installer");

    assert!(parse_project_url("https://modrinth.com/").is_none());
    assert!(parse_project_url("https://modrinth.com/user/someone").is_none());
    assert!(parse_project_url("https://github.com/owner").is_none());
    assert!(parse_project_url("https://cdn.example.org/file.jar").is_none());
}

#[tokio::test]
async fn test_add_from_url_uses_majority_game_version() {
    let registry = registry();
    let mut db = database();

    let request = AddRequest {
        source: "https://modrinth.com/mod/sodium".to_string(),
        loader: Loader::Fabric,
        ..AddRequest::default()
    };
    let added = add_record(&mut db, &registry, request).await.unwrap();

    assert_eq!(added.id, "sodium");
    assert_eq!(added.name, "Sodium");
    assert_eq!(added.provider, ProviderKind::Modrinth);
    assert_eq!(added.current.version, "0.6.14");
    assert_eq!(added.current.game_version, "1.21.5");
    assert_eq!(added.jar, "sodium-0.6.14.jar");
    assert_eq!(added.current_dependencies.required.len(), 1);
    assert!(added.next.is_empty());
    assert!(!added.has_drifted());

    assert_eq!(db.len(), 4);
    assert_eq!(db.find("sodium"), Some(&added));
}

#[tokio::test]
async fn test_add_duplicate_is_rejected() {
    let registry = registry();
    let mut db = database();
    let request = AddRequest {
        source: "sodium".to_string(),
        provider: Some(ProviderKind::Modrinth),
        loader: Loader::Fabric,
        ..AddRequest::default()
    };

    add_record(&mut db, &registry, request.clone()).await.unwrap();
    let err = add_record(&mut db, &registry, request).await.unwrap_err();
    assert!(matches!(
        err,
        AddError::Database {
            source: DatabaseError::DuplicateRecord { .. }
        }
    ));
    assert_eq!(db.len(), 4);
}

#[tokio::test]
async fn test_add_unknown_project_leaves_database_alone() {
    let registry = registry();
    let mut db = database();
    let request = AddRequest {
        source: "does-not-exist".to_string(),
        ..AddRequest::default()
    };

    let err = add_record(&mut db, &registry, request).await.unwrap_err();
    assert!(matches!(err, AddError::Resolve { ref source } if source.is_not_found()));
    assert_eq!(db.len(), 3);
}

#[tokio::test]
async fn test_add_direct_download() {
    let registry = ProviderRegistry::new();
    let mut db = database();

    let missing_version = AddRequest {
        source: "https://example.org/files/pack-1.2.zip?download=1".to_string(),
        mod_type: Some(ModType::Datapack),
        ..AddRequest::default()
    };
    assert!(matches!(
        add_record(&mut db, &registry, missing_version.clone()).await,
        Err(AddError::MissingField { field: "version" })
    ));

    let request = AddRequest {
        version: Some("1.2".to_string()),
        ..missing_version
    };
    let added = add_record(&mut db, &registry, request).await.unwrap();
    assert_eq!(added.provider, ProviderKind::Direct);
    assert_eq!(added.id, "pack-1.2");
    assert_eq!(added.jar, "pack-1.2.zip");
    assert_eq!(added.current.version, "1.2");
    assert_eq!(added.current.game_version, "1.21.5");
    assert_eq!(added.current.url, "https://example.org/files/pack-1.2.zip?download=1");
}

#[tokio::test]
async fn test_add_requires_credentials() {
    let registry = ProviderRegistry::new().with_provider(Arc::new(
        MockVersionProvider::new(ProviderKind::CurseForge).unconfigured(),
    ));
    let mut db = database();
    let request = AddRequest {
        source: "https://www.curseforge.com/minecraft/mc-mods/jei".to_string(),
        ..AddRequest::default()
    };

    let err = add_record(&mut db, &registry, request).await.unwrap_err();
    assert!(matches!(err, AddError::Configuration { .. }));
}
