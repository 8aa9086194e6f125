//! Registry trait for fetching version tags from remote sources

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::PackageVersions;

/// Which side of the reconciliation a registry feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Upstream GitHub releases
    GitHubReleases,
    /// Tags already pushed to Docker Hub
    DockerHub,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GitHubReleases => "GitHub releases",
            SourceKind::DockerHub => "Docker Hub tags",
        }
    }
}

/// Trait for fetching the complete tag list of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Returns the side of the comparison this registry provides
    fn source_kind(&self) -> SourceKind;

    /// Fetches every tag of a repository, following pagination
    ///
    /// # Arguments
    /// * `repository` - `owner/name` (GitHub) or `namespace/name` (Docker Hub)
    ///
    /// # Returns
    /// * `Ok(PackageVersions)` - Raw tag names, unfiltered
    /// * `Err(RegistryError)` - If any page fails to load
    async fn fetch_all_versions(&self, repository: &str) -> Result<PackageVersions, RegistryError>;
}
