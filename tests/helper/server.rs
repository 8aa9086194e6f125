//! mockito servers standing in for GitHub and Docker Hub

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

pub const UPSTREAM: &str = "sagiegurari/cargo-make";
pub const IMAGE: &str = "mbround18/cargo-make";

/// Serve `tags` as a single page of GitHub releases for [`UPSTREAM`]
pub async fn mock_releases(server: &mut ServerGuard, tags: &[&str]) -> Mock {
    let body: Vec<_> = tags.iter().map(|t| json!({ "tag_name": t })).collect();
    server
        .mock("GET", format!("/repos/{}/releases", UPSTREAM).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&body).unwrap())
        .create_async()
        .await
}

/// Serve `tags` as a single page of Docker Hub tags for [`IMAGE`]
pub async fn mock_hub_tags(server: &mut ServerGuard, tags: &[&str]) -> Mock {
    let results: Vec<_> = tags.iter().map(|t| json!({ "name": t })).collect();
    server
        .mock("GET", format!("/v2/repositories/{}/tags", IMAGE).as_str())
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "count": tags.len(), "next": null, "results": results }).to_string())
        .create_async()
        .await
}

/// Make the GitHub releases endpoint fail with `status`
pub async fn mock_releases_error(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("GET", format!("/repos/{}/releases", UPSTREAM).as_str())
        .match_query(Matcher::Any)
        .with_status(status)
        .create_async()
        .await
}
