//! Adding records
//!
//! A record is added from a project URL, a bare id plus provider, or
//! manual fields for plain download links. Metadata and the current
//! version are resolved right away; Next and Latest stay empty until the
//! next validate run.

use thiserror::Error;
use tracing::{debug, info};

use super::database::{Database, DatabaseError};
use super::record::{Dependencies, ModRecord, VersionSlot};
use super::versions::majority_game_version;
use crate::api::{ProviderRegistry, ResolveError, VersionQuery};
use crate::primitives::{ConfigError, Loader, ModGroup, ModType, ProviderKind};

#[derive(Debug, Error)]
pub enum AddError {
    #[error(transparent)]
    Database {
        #[from]
        source: DatabaseError,
    },

    #[error(transparent)]
    Resolve {
        #[from]
        source: ResolveError,
    },

    #[error(transparent)]
    Configuration {
        #[from]
        source: ConfigError,
    },

    #[error("A direct download needs --{field}")]
    MissingField { field: &'static str },
}

/// A project reference recovered from a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub provider: ProviderKind,
    pub id: String,
    pub mod_type: Option<ModType>,
}

/// Recognise project pages of the hosted providers
///
/// ```
/// use modlist_lib::modlist::add::parse_project_url;
/// use modlist_lib::primitives::{ModType, ProviderKind};
///
/// let project = parse_project_url("https://modrinth.com/mod/fabric-api").unwrap();
/// assert_eq!(project.provider, ProviderKind::Modrinth);
/// assert_eq!(project.id, "fabric-api");
/// assert_eq!(project.mod_type, Some(ModType::Mod));
///
/// assert!(parse_project_url("https://example.org/pack.zip").is_none());
/// ```
pub fn parse_project_url(url: &str) -> Option<ProjectRef> {
    let provider = ProviderKind::from_url(url);
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url)
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let segments: Vec<&str> = path.split('/').skip(1).filter(|s| !s.is_empty()).collect();

    match provider {
        ProviderKind::Modrinth => {
            let [kind, slug, ..] = segments.as_slice() else {
                return None;
            };
            let mod_type = match *kind {
                "mod" => ModType::Mod,
                "modpack" => ModType::Modpack,
                "shader" => ModType::Shader,
                "datapack" => ModType::Datapack,
                "resourcepack" => ModType::Resourcepack,
                "plugin" => ModType::Plugin,
                _ => return None,
            };
            Some(ProjectRef {
                provider,
                id: slug.to_string(),
                mod_type: Some(mod_type),
            })
        }
        ProviderKind::CurseForge => {
            let ["minecraft", class, slug, ..] = segments.as_slice() else {
                return None;
            };
            let mod_type = match *class {
                "mc-mods" => Some(ModType::Mod),
                "modpacks" => Some(ModType::Modpack),
                "texture-packs" => Some(ModType::Resourcepack),
                "shaders" => Some(ModType::Shader),
                "data-packs" => Some(ModType::Datapack),
                "bukkit-plugins" => Some(ModType::Plugin),
                _ => None,
            };
            Some(ProjectRef {
                provider,
                id: slug.to_string(),
                mod_type,
            })
        }
        ProviderKind::GitHub => {
            let [owner, repo, ..] = segments.as_slice() else {
                return None;
            };
            let repo = repo.trim_end_matches(".git");
            Some(ProjectRef {
                provider,
                id: format!("{}/{}", owner, repo),
                mod_type: Some(ModType::from_repo_name(repo)),
            })
        }
        _ => None,
    }
}

/// What to add
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    /// Project URL or id
    pub source: String,
    /// Provider for a bare id (Modrinth when unset)
    pub provider: Option<ProviderKind>,
    /// Stored id, overriding the one derived from the source
    pub id: Option<String>,
    pub mod_type: Option<ModType>,
    pub loader: Loader,
    pub group: ModGroup,
    /// Defaults to the database's majority game version
    pub game_version: Option<String>,
    /// Version to pin; the newest matching release when unset
    pub version: Option<String>,
    /// Download URL of a direct record
    pub download_url: Option<String>,
    pub name: Option<String>,
}

impl AddRequest {
    fn is_url(&self) -> bool {
        self.source.contains("://")
    }
}

/// Resolve a request into a record and add it to the database
pub async fn add_record(
    database: &mut Database,
    registry: &ProviderRegistry,
    request: AddRequest,
) -> Result<ModRecord, AddError> {
    let game_version = request
        .game_version
        .clone()
        .filter(|gv| !gv.trim().is_empty())
        .or_else(|| majority_game_version(database.records()));

    let project = if request.is_url() {
        parse_project_url(&request.source)
    } else {
        Some(ProjectRef {
            provider: request.provider.unwrap_or_default(),
            id: request.source.trim().to_string(),
            mod_type: None,
        })
    };

    let record = match project {
        Some(project) if project.provider.is_resolvable() => {
            resolve_record(registry, &request, project, game_version).await?
        }
        _ => direct_record(&request, game_version)?,
    };

    database.add_record(record)?;
    let added = database
        .records()
        .last()
        .cloned()
        .ok_or(DatabaseError::RecordNotFound {
            id: request.source.clone(),
        })?;

    info!("Added {} from {}", added.label(), added.provider);
    Ok(added)
}

async fn resolve_record(
    registry: &ProviderRegistry,
    request: &AddRequest,
    project: ProjectRef,
    game_version: Option<String>,
) -> Result<ModRecord, AddError> {
    registry.ensure_configured([project.provider])?;

    let metadata = registry.project(project.provider, &project.id).await?;
    let mod_type = request
        .mod_type
        .or(project.mod_type)
        .or(metadata.mod_type)
        .unwrap_or_default();
    let id = request
        .id
        .clone()
        .or_else(|| Some(metadata.id.clone()).filter(|id| !id.is_empty()))
        .unwrap_or_else(|| project.id.clone());

    let query = VersionQuery::new(project.id.clone(), request.loader.clone(), mod_type)
        .with_game_version(game_version.as_deref())
        .with_version(request.version.as_deref());
    let resolved = registry.resolve(project.provider, &query).await?;
    debug!("Resolved {} to {}", project.id, resolved.version);

    let mut record = ModRecord::new(id, mod_type, request.loader.clone());
    record.group = request.group;
    record.provider = project.provider;
    record.host = project.provider.to_string();
    metadata.apply_to(&mut record);
    if let Some(name) = &request.name {
        record.name = name.clone();
    }

    record.current = VersionSlot::resolved(
        resolved.version,
        resolved.download_url,
        game_version.unwrap_or(resolved.game_version),
    );
    record.jar = resolved.jar_filename;
    record.current_dependencies = Dependencies::from_refs(resolved.dependencies);
    record.available_game_versions = resolved.available_game_versions;
    Ok(record)
}

fn direct_record(request: &AddRequest, game_version: Option<String>) -> Result<ModRecord, AddError> {
    let download_url = request
        .download_url
        .clone()
        .or_else(|| request.is_url().then(|| request.source.trim().to_string()))
        .ok_or(AddError::MissingField { field: "url" })?;
    let version = request
        .version
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or(AddError::MissingField { field: "version" })?;

    let file_name = download_url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("download")
        .to_string();
    let id = request.id.clone().unwrap_or_else(|| {
        file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| file_name.clone())
    });

    let mut record = ModRecord::new(id, request.mod_type.unwrap_or_default(), request.loader.clone());
    record.group = request.group;
    record.provider = ProviderKind::Direct;
    record.host = ProviderKind::Direct.to_string();
    record.url = if request.is_url() {
        request.source.trim().to_string()
    } else {
        download_url.clone()
    };
    record.name = request.name.clone().unwrap_or_else(|| record.id.clone());
    record.current = VersionSlot::resolved(version, download_url, game_version.unwrap_or_default());
    record.jar = file_name;
    Ok(record)
}

#[cfg(test)]
mod tests {
    include!("add.test.rs");
}
