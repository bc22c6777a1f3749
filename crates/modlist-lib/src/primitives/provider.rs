//! Provider identities
//!
//! Canonical enumeration of the services modlist resolves versions from. A
//! record's provider is resolved once when the row is read (from `ApiSource`,
//! falling back to the project URL) and carried on the record afterwards.
//!
//! # Important Distinction
//! Fabric appears twice in this domain: as a mod LOADER (see
//! [`Loader`](super::Loader)) and as a PROVIDER of loader/installer jars
//! (Fabric Meta). This enum only models the latter.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::impl_fromstr_for_value_enum;

/// Where a record's versions and download URLs come from
///
/// ```
/// use modlist_lib::primitives::ProviderKind;
///
/// let provider: ProviderKind = "curse".parse().unwrap();
/// assert_eq!(provider, ProviderKind::CurseForge);
/// assert!(provider.requires_api_key());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Modrinth v2 API
    #[default]
    Modrinth,
    /// CurseForge v1 API (API key required)
    #[value(name = "curseforge", alias = "curse")]
    CurseForge,
    /// GitHub releases of `owner/repo`
    #[value(name = "github", alias = "gh")]
    GitHub,
    /// Mojang version manifest (official server jars)
    Mojang,
    /// Fabric Meta (loader and installer jars)
    Fabric,
    /// Plain download URL, nothing to resolve
    Direct,
}

impl_fromstr_for_value_enum!(ProviderKind, "unknown provider");

impl ProviderKind {
    /// Every provider that can resolve versions
    pub const RESOLVABLE: [ProviderKind; 5] = [
        ProviderKind::Modrinth,
        ProviderKind::CurseForge,
        ProviderKind::GitHub,
        ProviderKind::Mojang,
        ProviderKind::Fabric,
    ];

    /// Lowercase identifier used in the database and in cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Modrinth => "modrinth",
            ProviderKind::CurseForge => "curseforge",
            ProviderKind::GitHub => "github",
            ProviderKind::Mojang => "mojang",
            ProviderKind::Fabric => "fabric",
            ProviderKind::Direct => "direct",
        }
    }

    /// Default API base URL (without trailing slash)
    pub fn api_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Modrinth => "https://api.modrinth.com/v2",
            ProviderKind::CurseForge => "https://api.curseforge.com",
            ProviderKind::GitHub => "https://api.github.com",
            ProviderKind::Mojang => "https://piston-meta.mojang.com",
            ProviderKind::Fabric => "https://meta.fabricmc.net",
            ProviderKind::Direct => "",
        }
    }

    /// Check if this provider refuses requests without an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderKind::CurseForge)
    }

    /// Environment variable holding the API key or token
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::CurseForge => Some("CURSEFORGE_API_KEY"),
            ProviderKind::GitHub => Some("GITHUB_TOKEN"), // Optional, raises rate limits
            _ => None,
        }
    }

    /// Maximum number of in-flight requests against this provider
    ///
    /// CurseForge throttles aggressively, so it is serialized.
    pub fn max_concurrent_requests(&self) -> usize {
        match self {
            ProviderKind::CurseForge => 1,
            _ => 4,
        }
    }

    /// Whether rows from this provider can be re-resolved
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, ProviderKind::Direct)
    }

    /// Detect the provider hosting a project or download URL
    ///
    /// ```
    /// use modlist_lib::primitives::ProviderKind;
    ///
    /// assert_eq!(
    ///     ProviderKind::from_url("https://modrinth.com/mod/fabric-api"),
    ///     ProviderKind::Modrinth
    /// );
    /// assert_eq!(
    ///     ProviderKind::from_url("https://example.org/pack.zip"),
    ///     ProviderKind::Direct
    /// );
    /// ```
    pub fn from_url(url: &str) -> ProviderKind {
        let host = url_host(url);
        let matches_domain =
            |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));

        if matches_domain("modrinth.com") {
            ProviderKind::Modrinth
        } else if matches_domain("curseforge.com") || matches_domain("forgecdn.net") {
            ProviderKind::CurseForge
        } else if matches_domain("github.com") {
            ProviderKind::GitHub
        } else if matches_domain("mojang.com") || matches_domain("minecraft.net") {
            ProviderKind::Mojang
        } else if matches_domain("fabricmc.net") {
            ProviderKind::Fabric
        } else {
            ProviderKind::Direct
        }
    }
}

/// Lowercased host part of a URL, empty when there is none
pub(crate) fn url_host(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    host.split(':').next().unwrap_or_default().to_lowercase()
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    include!("provider.test.rs");
}
