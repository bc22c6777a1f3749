//! In-memory provider for tests
//!
//! Answers are registered per project id and requested game version. A
//! query for a game version nobody registered is "not found", which is how
//! a project that does not support the next game version looks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ProjectMetadata, ResolveError, ResolveFuture, ResolvedVersion, VersionProvider, VersionQuery};
use crate::networking::NetworkingError;
use crate::primitives::ProviderKind;

/// Mock provider (testing)
#[derive(Debug, Clone)]
pub struct MockVersionProvider {
    provider: ProviderKind,
    configured: bool,
    versions: HashMap<(String, Option<String>), ResolvedVersion>,
    projects: HashMap<String, ProjectMetadata>,
    failing: HashSet<String>,
    calls: Arc<AtomicUsize>,
}

impl MockVersionProvider {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            configured: true,
            versions: HashMap::new(),
            projects: HashMap::new(),
            failing: HashSet::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer for `id` when asked for `game_version` (`None`: no filter)
    pub fn with_version(mut self, id: &str, game_version: Option<&str>, resolved: ResolvedVersion) -> Self {
        self.versions
            .insert((id.to_lowercase(), game_version.map(str::to_string)), resolved);
        self
    }

    pub fn with_project(mut self, id: &str, metadata: ProjectMetadata) -> Self {
        self.projects.insert(id.to_lowercase(), metadata);
        self
    }

    /// Every request for `id` fails with a 503
    pub fn with_failure(mut self, id: &str) -> Self {
        self.failing.insert(id.to_lowercase());
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Number of resolve and project requests answered so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self, id: &str) -> Result<(), ResolveError> {
        if self.failing.contains(&id.to_lowercase()) {
            return Err(NetworkingError::HttpStatus {
                status: 503,
                url: format!("mock://{}/{}", self.provider, id),
            }
            .into());
        }
        Ok(())
    }
}

impl VersionProvider for MockVersionProvider {
    fn provider(&self) -> ProviderKind {
        self.provider
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn resolve_version<'a>(&'a self, query: &'a VersionQuery) -> ResolveFuture<'a, ResolvedVersion> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_failure(&query.id)?;

            let key = (query.id.to_lowercase(), query.game_version.clone());
            self.versions.get(&key).cloned().ok_or_else(|| {
                ResolveError::not_found(self.provider, &query.id, "no mock version registered")
            })
        })
    }

    fn fetch_project<'a>(&'a self, id: &'a str) -> ResolveFuture<'a, ProjectMetadata> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_failure(id)?;

            self.projects
                .get(&id.to_lowercase())
                .cloned()
                .ok_or_else(|| ResolveError::not_found(self.provider, id, "no mock project registered"))
        })
    }
}

#[cfg(test)]
mod tests {
    include!("mock.test.rs");
}
