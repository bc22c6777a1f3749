use super::*;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_cache_mode_from_flags() {
    assert_eq!(CacheMode::from_flags(false, false), CacheMode::Refresh);
    assert_eq!(CacheMode::from_flags(true, false), CacheMode::ReadThrough);
    assert_eq!(CacheMode::from_flags(false, true), CacheMode::CachedOnly);
    assert_eq!(CacheMode::from_flags(true, true), CacheMode::CachedOnly);

    assert!(!CacheMode::Refresh.reads_cache());
    assert!(CacheMode::ReadThrough.allows_network());
    assert!(!CacheMode::CachedOnly.allows_network());
}

#[test]
fn test_cache_key_ignores_parameter_order() {
    let a = CacheKey::new(
        ProviderKind::Modrinth,
        &[("endpoint", "versions"), ("id", "sodium")],
    );
    let b = CacheKey::new(
        ProviderKind::Modrinth,
        &[("id", "sodium"), ("endpoint", "versions")],
    );
    assert_eq!(a, b);
    assert_eq!(a.file_name(), b.file_name());
    assert_eq!(a.canonical(), "modrinth?endpoint=versions&id=sodium");
}

#[test]
fn test_cache_key_distinguishes_providers_and_values() {
    let modrinth = CacheKey::new(ProviderKind::Modrinth, &[("id", "sodium")]);
    let curseforge = CacheKey::new(ProviderKind::CurseForge, &[("id", "sodium")]);
    let other = CacheKey::new(ProviderKind::Modrinth, &[("id", "lithium")]);

    assert_ne!(modrinth.file_name(), curseforge.file_name());
    assert_ne!(modrinth.file_name(), other.file_name());
}

#[test]
fn test_cache_key_file_name_is_filesystem_safe() {
    let key = CacheKey::new(ProviderKind::GitHub, &[("repo", "Owner/Repo Name?x")]);
    let name = key.file_name();
    assert!(name.starts_with("github-owner_repo_name_x-"));
    assert!(name.ends_with(".json"));
    assert!(!name.contains('/'));
}

#[test]
fn test_cacheable_statuses() {
    assert!(CachedResponse::is_cacheable_status(200));
    assert!(CachedResponse::is_cacheable_status(204));
    assert!(CachedResponse::is_cacheable_status(404));
    assert!(!CachedResponse::is_cacheable_status(429));
    assert!(!CachedResponse::is_cacheable_status(500));
}

#[tokio::test]
async fn test_put_then_get_from_fresh_cache_reads_disk() {
    let temp_dir = TempDir::new().unwrap();
    let key = CacheKey::new(ProviderKind::Modrinth, &[("id", "fabric-api")]);
    let response = CachedResponse::ok(json!({"slug": "fabric-api"}));

    let cache = HttpCache::new(temp_dir.path().to_path_buf());
    cache.put(&key, response.clone()).await.unwrap();
    assert!(cache.path_for(&key).exists());

    let fresh = HttpCache::new(temp_dir.path().to_path_buf());
    assert!(fresh.is_empty().await);
    assert_eq!(fresh.get(&key).await, Some(response));
    assert_eq!(fresh.len().await, 1);
}

#[tokio::test]
async fn test_not_found_is_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let cache = HttpCache::new(temp_dir.path().to_path_buf());
    let key = CacheKey::new(ProviderKind::Modrinth, &[("id", "missing")]);

    cache.put(&key, CachedResponse::not_found()).await.unwrap();

    let cached = cache.get(&key).await.unwrap();
    assert!(cached.is_not_found());
}

#[tokio::test]
async fn test_server_errors_are_not_recorded() {
    let temp_dir = TempDir::new().unwrap();
    let cache = HttpCache::new(temp_dir.path().to_path_buf());
    let key = CacheKey::new(ProviderKind::CurseForge, &[("id", "1")]);

    cache
        .put(
            &key,
            CachedResponse {
                status: 503,
                data: serde_json::Value::Null,
            },
        )
        .await
        .unwrap();

    assert!(cache.get(&key).await.is_none());
    assert!(!cache.path_for(&key).exists());
}

#[tokio::test]
async fn test_put_replaces_previous_response() {
    let temp_dir = TempDir::new().unwrap();
    let cache = HttpCache::new(temp_dir.path().to_path_buf());
    let key = CacheKey::new(ProviderKind::Fabric, &[("endpoint", "installer")]);

    cache.put(&key, CachedResponse::ok(json!([1]))).await.unwrap();
    cache.put(&key, CachedResponse::ok(json!([2]))).await.unwrap();

    let fresh = HttpCache::new(temp_dir.path().to_path_buf());
    assert_eq!(fresh.get(&key).await.unwrap().data, json!([2]));
}

#[tokio::test]
async fn test_corrupt_file_is_a_miss() {
    let temp_dir = TempDir::new().unwrap();
    let cache = HttpCache::new(temp_dir.path().to_path_buf());
    let key = CacheKey::new(ProviderKind::Mojang, &[("endpoint", "manifest")]);

    std::fs::write(cache.path_for(&key), b"{not json").unwrap();
    assert!(cache.get(&key).await.is_none());
}

#[tokio::test]
async fn test_put_creates_missing_cache_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("responses").join("nested");
    let cache = HttpCache::new(nested.clone());
    let key = CacheKey::new(ProviderKind::GitHub, &[("repo", "a/b")]);

    cache.put(&key, CachedResponse::ok(json!([]))).await.unwrap();
    assert!(nested.is_dir());
}

#[tokio::test]
async fn test_clear_removes_recorded_responses() {
    let temp_dir = TempDir::new().unwrap();
    let cache = HttpCache::new(temp_dir.path().to_path_buf());
    let keep = temp_dir.path().join("notes.txt");
    std::fs::write(&keep, "not a response").unwrap();

    for id in ["a", "b"] {
        let key = CacheKey::new(ProviderKind::Modrinth, &[("id", id)]);
        cache.put(&key, CachedResponse::ok(json!({}))).await.unwrap();
    }

    assert_eq!(cache.clear().await.unwrap(), 2);
    assert!(cache.is_empty().await);
    assert!(keep.exists());
    let key = CacheKey::new(ProviderKind::Modrinth, &[("id", "a")]);
    assert!(cache.get(&key).await.is_none());
}

#[tokio::test]
async fn test_clear_missing_dir_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let cache = HttpCache::new(temp_dir.path().join("never-created"));
    assert_eq!(cache.clear().await.unwrap(), 0);
}
