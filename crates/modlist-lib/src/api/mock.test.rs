use super::*;
use crate::primitives::{Loader, ModType};

fn resolved(version: &str) -> ResolvedVersion {
    ResolvedVersion {
        version: version.to_string(),
        download_url: format!("https://cdn.example.org/{version}.jar"),
        jar_filename: format!("{version}.jar"),
        ..ResolvedVersion::default()
    }
}

#[tokio::test]
async fn test_mock_answers_by_game_version() {
    let mock = MockVersionProvider::new(ProviderKind::Modrinth)
        .with_version("Sodium", Some("1.21.5"), resolved("0.6.0"))
        .with_version("sodium", None, resolved("0.7.0"));

    let query = VersionQuery::new("sodium", Loader::Fabric, ModType::Mod);
    assert_eq!(
        mock.resolve_version(&query.clone().with_game_version(Some("1.21.5")))
            .await
            .unwrap()
            .version,
        "0.6.0"
    );
    assert_eq!(mock.resolve_version(&query).await.unwrap().version, "0.7.0");
    assert!(mock
        .resolve_version(&query.with_game_version(Some("1.21.6")))
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(mock.calls(), 3);
}

#[tokio::test]
async fn test_mock_failure_is_transient() {
    let mock = MockVersionProvider::new(ProviderKind::GitHub).with_failure("owner/repo");
    let query = VersionQuery::new("owner/repo", Loader::Fabric, ModType::Mod);
    assert!(matches!(
        mock.resolve_version(&query).await,
        Err(ResolveError::Transient { .. })
    ));
    assert!(mock.fetch_project("owner/repo").await.is_err());
}

#[test]
fn test_unconfigured_mock_fails_registry_check() {
    let registry = super::super::ProviderRegistry::new()
        .with_provider(Arc::new(MockVersionProvider::new(ProviderKind::CurseForge).unconfigured()));
    assert!(registry.ensure_configured([ProviderKind::CurseForge]).is_err());
}
