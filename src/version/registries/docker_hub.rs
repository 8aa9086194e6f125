//! Docker Hub tags API registry implementation

use crate::config::DOCKER_HUB_PAGE_SIZE;
use crate::version::error::RegistryError;
use crate::version::registry::{Registry, SourceKind};
use crate::version::types::PackageVersions;
use serde::Deserialize;
use tracing::{debug, warn};

/// Default base URL for Docker Hub
const DEFAULT_BASE_URL: &str = "https://hub.docker.com";

/// One page of the Docker Hub tags listing
#[derive(Debug, Deserialize)]
struct TagPage {
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    results: Vec<TagInfo>,
}

#[derive(Debug, Deserialize)]
struct TagInfo {
    name: String,
}

/// Registry implementation for the Docker Hub tags API
///
/// The read path needs no authentication.
pub struct DockerHubRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl DockerHubRegistry {
    /// Creates a new DockerHubRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-sync")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_page(&self, url: &str, repository: &str) -> Result<TagPage, RegistryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(repository.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(RegistryError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("Docker Hub returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse Docker Hub tags response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

impl Default for DockerHubRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Registry for DockerHubRegistry {
    fn source_kind(&self) -> SourceKind {
        SourceKind::DockerHub
    }

    async fn fetch_all_versions(&self, repository: &str) -> Result<PackageVersions, RegistryError> {
        let mut url = format!(
            "{}/v2/repositories/{}/tags?page_size={}",
            self.base_url, repository, DOCKER_HUB_PAGE_SIZE
        );
        let mut versions = Vec::new();

        loop {
            let page = self.fetch_page(&url, repository).await?;
            debug!("Docker Hub page {} returned {} tags", url, page.results.len());

            versions.extend(page.results.into_iter().map(|t| t.name));

            match page.next {
                Some(next) if !next.is_empty() && next != url => url = next,
                _ => break,
            }
        }

        Ok(PackageVersions::new(versions))
    }
}
