//! Registry implementations for fetching version tags

pub mod docker_hub;
pub mod github;

pub use docker_hub::DockerHubRegistry;
pub use github::GitHubRegistry;
