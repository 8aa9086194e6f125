//! GitHub Releases API registry implementation

use crate::config::GITHUB_PAGE_SIZE;
use crate::version::error::RegistryError;
use crate::version::registry::{Registry, SourceKind};
use crate::version::types::PackageVersions;
use serde::Deserialize;
use tracing::{debug, warn};

/// Default base URL for GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Response from GitHub Releases API
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Registry implementation for GitHub Releases API
pub struct GitHubRegistry {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    page_size: usize,
}

impl GitHubRegistry {
    /// Creates a new GitHubRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-sync")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            page_size: GITHUB_PAGE_SIZE,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    async fn fetch_page(
        &self,
        repository: &str,
        page: usize,
    ) -> Result<Vec<Release>, RegistryError> {
        let url = format!(
            "{}/repos/{}/releases?per_page={}&page={}",
            self.base_url, repository, self.page_size, page
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(repository.to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RegistryError::Unauthorized(
                "GitHub rejected the token".to_string(),
            ));
        }

        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0");

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || (status == reqwest::StatusCode::FORBIDDEN && rate_limit_exhausted)
        {
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
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

impl Default for GitHubRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl Registry for GitHubRegistry {
    fn source_kind(&self) -> SourceKind {
        SourceKind::GitHubReleases
    }

    async fn fetch_all_versions(&self, repository: &str) -> Result<PackageVersions, RegistryError> {
        let mut versions = Vec::new();
        let mut page = 1;

        loop {
            let releases = self.fetch_page(repository, page).await?;
            let count = releases.len();
            debug!("GitHub releases page {} returned {} entries", page, count);

            versions.extend(releases.into_iter().map(|r| r.tag_name));

            if count < self.page_size {
                break;
            }
            page += 1;
        }

        Ok(PackageVersions::new(versions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn page_query(per_page: usize, page: usize) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("per_page".into(), per_page.to_string()),
            Matcher::UrlEncoded("page".into(), page.to_string()),
        ])
    }

    #[tokio::test]
    async fn fetch_all_versions_returns_tag_names() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/sagiegurari/cargo-make/releases")
            .match_query(page_query(100, 1))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"tag_name": "0.37.2", "published_at": "2024-01-15T00:00:00Z"},
                    {"tag_name": "0.37.1", "published_at": "2024-01-01T00:00:00Z"},
                    {"tag_name": "nightly", "published_at": "2023-12-01T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url());
        let result = registry
            .fetch_all_versions("sagiegurari/cargo-make")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            result.versions,
            vec![
                "0.37.2".to_string(),
                "0.37.1".to_string(),
                "nightly".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn fetch_all_versions_follows_pages_until_short_page() {
        let mut server = Server::new_async().await;

        let first = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(page_query(2, 1))
            .with_status(200)
            .with_body(r#"[{"tag_name": "1.2.0"}, {"tag_name": "1.1.0"}]"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(page_query(2, 2))
            .with_status(200)
            .with_body(r#"[{"tag_name": "1.0.0"}]"#)
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url()).with_page_size(2);
        let result = registry.fetch_all_versions("owner/repo").await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(result.versions, vec!["1.2.0", "1.1.0", "1.0.0"]);
    }

    #[tokio::test]
    async fn fetch_all_versions_sends_bearer_token() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let registry =
            GitHubRegistry::new(&server.url()).with_token(Some("secret-token".to_string()));
        let result = registry.fetch_all_versions("owner/repo").await.unwrap();

        mock.assert_async().await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn fetch_all_versions_returns_not_found_for_nonexistent_repo() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/nonexistent/repo/releases")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url());
        let result = registry.fetch_all_versions("nonexistent/repo").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_all_versions_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "60")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url());
        let result = registry.fetch_all_versions("owner/repo").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(RegistryError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn fetch_all_versions_treats_exhausted_quota_403_as_rate_limited() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url());
        let result = registry.fetch_all_versions("owner/repo").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(RegistryError::RateLimited {
                retry_after_secs: None
            })
        ));
    }

    #[tokio::test]
    async fn fetch_all_versions_returns_unauthorized_for_bad_token() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "Bad credentials"}"#)
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url()).with_token(Some("stale".to_string()));
        let result = registry.fetch_all_versions("owner/repo").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn fetch_all_versions_fails_when_later_page_errors() {
        let mut server = Server::new_async().await;

        let _first = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(page_query(1, 1))
            .with_status(200)
            .with_body(r#"[{"tag_name": "1.0.0"}]"#)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(page_query(1, 2))
            .with_status(500)
            .create_async()
            .await;

        let registry = GitHubRegistry::new(&server.url()).with_page_size(1);
        let result = registry.fetch_all_versions("owner/repo").await;

        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }
}
