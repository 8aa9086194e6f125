use serde::Deserialize;
use std::path::PathBuf;

// =============================================================================
// Fixed pairing
// =============================================================================

/// Upstream GitHub repository whose releases are mirrored
pub const DEFAULT_UPSTREAM_REPO: &str = "sagiegurari/cargo-make";

/// Docker Hub repository the images are pushed to
pub const DEFAULT_IMAGE_REPO: &str = "mbround18/cargo-make";

/// Build argument carrying the release version into the Dockerfile
pub const DEFAULT_BUILD_ARG: &str = "CARGO_MAKE_VERSION";

/// Skip configuration, relative to the working directory
pub const DEFAULT_SKIP_CONFIG_PATH: &str = "config/skip.json";

// =============================================================================
// Limits
// =============================================================================

/// Number of build-and-push operations allowed to run at once
pub const MAX_CONCURRENT_BUILDS: usize = 4;

/// Page size requested from the GitHub Releases API (API maximum)
pub const GITHUB_PAGE_SIZE: usize = 100;

/// Page size requested from the Docker Hub tags API (API maximum)
pub const DOCKER_HUB_PAGE_SIZE: usize = 100;

/// Environment variable checked first for a GitHub token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Settings for one reconciliation/sync invocation
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// `owner/name` of the upstream GitHub repository
    pub upstream_repo: String,
    /// `namespace/name` of the Docker Hub repository
    pub image_repo: String,
    /// Directory sent to the daemon as build context
    pub build_context: PathBuf,
    /// Dockerfile path inside the build context
    pub dockerfile: String,
    /// Name of the build argument set to the version
    pub build_arg: String,
    /// Location of the skip configuration file
    pub skip_config: PathBuf,
    /// Worker pool size for the build dispatcher
    pub max_concurrent_builds: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            upstream_repo: DEFAULT_UPSTREAM_REPO.to_string(),
            image_repo: DEFAULT_IMAGE_REPO.to_string(),
            build_context: PathBuf::from("."),
            dockerfile: "Dockerfile".to_string(),
            build_arg: DEFAULT_BUILD_ARG.to_string(),
            skip_config: PathBuf::from(DEFAULT_SKIP_CONFIG_PATH),
            max_concurrent_builds: MAX_CONCURRENT_BUILDS,
        }
    }
}

/// Returns the directory holding the docker CLI configuration.
/// Uses $DOCKER_CONFIG if set, otherwise ~/.docker,
/// or ./.docker if no home directory is available.
pub fn docker_config_dir() -> PathBuf {
    docker_config_dir_with_env(std::env::var("DOCKER_CONFIG").ok(), dirs::home_dir())
}

fn docker_config_dir_with_env(docker_config: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    docker_config
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".docker")))
        .unwrap_or_else(|| PathBuf::from(".docker"))
}
