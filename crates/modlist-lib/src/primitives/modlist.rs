use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

use super::impl_fromstr_for_value_enum;

/// Inclusion group of a database row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModGroup {
    /// Always installed
    #[default]
    Required,
    /// Installed on request
    Optional,
    /// Tracked but never downloaded or run
    #[value(alias = "blocked")]
    Block,
}

impl_fromstr_for_value_enum!(ModGroup, "invalid group (expected required, optional or block)");

impl ModGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModGroup::Required => "required",
            ModGroup::Optional => "optional",
            ModGroup::Block => "block",
        }
    }
}

impl fmt::Display for ModGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project types tracked in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModType {
    #[default]
    Mod,
    Modpack,
    #[value(alias = "shaderpack")]
    Shader,
    #[value(alias = "data-pack")]
    Datapack,
    #[value(alias = "resource-pack", alias = "texturepack")]
    Resourcepack,
    Plugin,
    /// Official server jar
    Server,
    /// Loader server launcher jar
    Launcher,
    /// Loader installer jar
    Installer,
}

impl_fromstr_for_value_enum!(ModType, "invalid project type");

impl ModType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModType::Mod => "mod",
            ModType::Modpack => "modpack",
            ModType::Shader => "shader",
            ModType::Datapack => "datapack",
            ModType::Resourcepack => "resourcepack",
            ModType::Plugin => "plugin",
            ModType::Server => "server",
            ModType::Launcher => "launcher",
            ModType::Installer => "installer",
        }
    }

    /// Server, launcher and installer rows describe the game runtime rather
    /// than content, and are left out of fleet-wide version statistics.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, ModType::Server | ModType::Launcher | ModType::Installer)
    }

    /// Whether a release must target the record's loader to be usable
    pub fn is_loader_specific(&self) -> bool {
        matches!(self, ModType::Mod | ModType::Modpack | ModType::Plugin)
    }

    /// Preferred artifact extension for release assets
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            ModType::Shader | ModType::Datapack | ModType::Resourcepack => "zip",
            ModType::Modpack => "mrpack",
            _ => "jar",
        }
    }

    /// Sub-folder of `<root>/<gameVersion>/` downloads of this type land in
    pub fn download_folder(&self) -> Option<&'static str> {
        match self {
            ModType::Mod => Some("mods"),
            ModType::Modpack => Some("modpacks"),
            ModType::Shader => Some("shaderpacks"),
            ModType::Datapack => Some("datapacks"),
            ModType::Resourcepack => Some("resourcepacks"),
            ModType::Plugin => Some("plugins"),
            ModType::Server | ModType::Launcher | ModType::Installer => None,
        }
    }

    /// Infer a type from a repository name prefix (`shader-x` is a shader)
    ///
    /// ```
    /// use modlist_lib::primitives::ModType;
    ///
    /// assert_eq!(ModType::from_repo_name("mod-bigger-ender-chests"), ModType::Mod);
    /// assert_eq!(ModType::from_repo_name("shader-x"), ModType::Shader);
    /// assert_eq!(ModType::from_repo_name("sodium"), ModType::Mod);
    /// ```
    pub fn from_repo_name(repo: &str) -> ModType {
        let name = repo.rsplit('/').next().unwrap_or(repo).to_lowercase();
        const PREFIXES: [(&str, ModType); 5] = [
            ("mod-", ModType::Mod),
            ("shader-", ModType::Shader),
            ("datapack-", ModType::Datapack),
            ("resourcepack-", ModType::Resourcepack),
            ("plugin-", ModType::Plugin),
        ];

        PREFIXES
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, mod_type)| *mod_type)
            .unwrap_or_default()
    }
}

impl fmt::Display for ModType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mod loader a record targets
///
/// Unknown loaders are kept verbatim so they survive a round trip through
/// the database. A blank cell is `Unspecified` and matches any loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Loader {
    #[default]
    Fabric,
    Forge,
    NeoForge,
    Quilt,
    Vanilla,
    Unspecified,
    Other(String),
}

impl Loader {
    pub fn parse(input: &str) -> Loader {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Loader::Unspecified,
            "fabric" => Loader::Fabric,
            "forge" => Loader::Forge,
            "neoforge" => Loader::NeoForge,
            "quilt" => Loader::Quilt,
            "vanilla" | "minecraft" => Loader::Vanilla,
            _ => Loader::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Loader::Fabric => "fabric",
            Loader::Forge => "forge",
            Loader::NeoForge => "neoforge",
            Loader::Quilt => "quilt",
            Loader::Vanilla => "vanilla",
            Loader::Unspecified => "",
            Loader::Other(name) => name,
        }
    }

    /// Case-insensitive match against a provider's loader label
    pub fn matches(&self, label: &str) -> bool {
        *self == Loader::Unspecified || label.eq_ignore_ascii_case(self.as_str())
    }

    pub fn is_unspecified(&self) -> bool {
        *self == Loader::Unspecified
    }
}

impl std::str::FromStr for Loader {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Loader::parse(s))
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three version slots carried by every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum SlotKind {
    #[default]
    Current,
    Next,
    Latest,
}

impl_fromstr_for_value_enum!(SlotKind, "invalid version slot (expected current, next or latest)");

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Current => f.write_str("current"),
            SlotKind::Next => f.write_str("next"),
            SlotKind::Latest => f.write_str("latest"),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("modlist.test.rs");
}
