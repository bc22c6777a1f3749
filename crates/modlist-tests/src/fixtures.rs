//! Fixture infrastructure for E2E tests
//!
//! Provider responses shaped like the real Modrinth and Fabric APIs, and a
//! small mod database that exercises every column family.

use serde_json::{Value, json};

/// Database with a Modrinth mod, a Fabric launcher, a blocked row and a
/// user column that tools must carry through untouched
pub const SAMPLE_DATABASE: &str = "\
Group,Type,CurrentGameVersion,ID,Loader,CurrentVersion,Jar,CurrentVersionUrl,ApiSource,Notes
required,mod,1.21.5,fabric-api,fabric,0.127.1+1.21.5,fabric-api-0.127.1+1.21.5.jar,,modrinth,core library
optional,mod,1.21.5,sodium,fabric,,,,modrinth,
block,mod,1.21.5,old-mod,fabric,1.0,old-mod.jar,,direct,do not load
";

/// One Modrinth version entry
pub fn modrinth_version(version: &str, game_version: &str, url: &str) -> Value {
    let filename = url.rsplit('/').next().unwrap_or(version);
    json!({
        "version_number": version,
        "version_type": "release",
        "loaders": ["fabric"],
        "game_versions": [game_version],
        "date_published": "2025-06-01T00:00:00Z",
        "dependencies": [],
        "files": [{
            "url": url,
            "filename": filename,
            "primary": true,
            "hashes": {}
        }]
    })
}

/// `/project/fabric-api/version` body with releases for 1.21.5 and 1.21.6
pub fn fabric_api_versions(cdn: &str) -> String {
    json!([
        modrinth_version(
            "0.128.1+1.21.6",
            "1.21.6",
            &format!("{cdn}/fabric-api-0.128.1+1.21.6.jar"),
        ),
        modrinth_version(
            "0.127.1+1.21.5",
            "1.21.5",
            &format!("{cdn}/fabric-api-0.127.1+1.21.5.jar"),
        ),
    ])
    .to_string()
}

/// `/project/sodium/version` body with a 1.21.5 release only
pub fn sodium_versions(cdn: &str) -> String {
    json!([modrinth_version(
        "mc1.21.5-0.6.13-fabric",
        "1.21.5",
        &format!("{cdn}/sodium-fabric-0.6.13+mc1.21.5.jar"),
    )])
    .to_string()
}

/// `/project/<slug>` body
pub fn modrinth_project(id: &str, slug: &str, title: &str) -> String {
    json!({
        "id": id,
        "slug": slug,
        "title": title,
        "description": format!("{title} for Fabric"),
        "project_type": "mod",
        "categories": ["optimization"],
        "icon_url": format!("https://cdn.modrinth.com/data/{id}/icon.png"),
    })
    .to_string()
}
