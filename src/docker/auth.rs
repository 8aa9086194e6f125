//! Registry credentials for pushing
//!
//! Reads the docker CLI's `config.json` and turns a stored login into
//! bollard's [`DockerCredentials`]. Lookup order per registry: `credHelpers`
//! entry, inline `auths` entry, then the global `credsStore` helper.

use crate::config::docker_config_dir;
use crate::docker::error::{BuildError, BuildResult};
use base64::Engine;
use bollard::auth::DockerCredentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Server address docker uses for Docker Hub logins
const DOCKER_HUB_SERVER: &str = "https://index.docker.io/v1/";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DockerConfig {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
    #[serde(default)]
    creds_store: Option<String>,
    #[serde(default)]
    cred_helpers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    /// Base64 of "username:password"
    auth: Option<String>,
}

/// Response of `docker-credential-<helper> get`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialResponse {
    username: String,
    secret: String,
}

#[derive(Debug, Clone)]
pub struct RegistryAuth {
    config_path: PathBuf,
}

impl Default for RegistryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryAuth {
    /// Uses `$DOCKER_CONFIG/config.json` or `~/.docker/config.json`
    pub fn new() -> Self {
        Self {
            config_path: docker_config_dir().join("config.json"),
        }
    }

    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Credentials for the registry hosting `image`, if any are stored
    pub fn get_credentials(&self, image: &str) -> BuildResult<Option<DockerCredentials>> {
        let registry = extract_registry(image);

        if !self.config_path.exists() {
            tracing::debug!("Docker config.json not found at {:?}", self.config_path);
            return Ok(None);
        }

        let config = self.load_docker_config()?;
        let keys = registry_keys(&registry);

        for key in &keys {
            if let Some(helper) = config.cred_helpers.get(*key) {
                tracing::debug!("Trying credHelpers entry {} for {}", helper, key);
                if let Some(creds) = run_helper(helper, key)? {
                    return Ok(Some(creds));
                }
            }
        }

        for key in &keys {
            if let Some(auth_entry) = config.auths.get(*key)
                && let Some(auth_b64) = &auth_entry.auth
                && let Some(creds) = decode_auth(auth_b64, key)?
            {
                tracing::debug!("Found credentials in auths for {}", key);
                return Ok(Some(creds));
            }
        }

        if let Some(helper) = &config.creds_store {
            tracing::debug!("Trying credential helper: {}", helper);
            if let Some(creds) = run_helper(helper, keys[0])? {
                return Ok(Some(creds));
            }
        }

        tracing::debug!("No credentials found for {}", registry);
        Ok(None)
    }

    fn load_docker_config(&self) -> BuildResult<DockerConfig> {
        let content =
            std::fs::read_to_string(&self.config_path).map_err(|e| BuildError::AuthFailed {
                registry: self.config_path.display().to_string(),
                message: format!("Failed to read config.json: {}", e),
            })?;

        serde_json::from_str(&content).map_err(|e| BuildError::AuthFailed {
            registry: self.config_path.display().to_string(),
            message: format!("Failed to parse config.json: {}", e),
        })
    }
}

/// Registry host of an image reference; bare names live on Docker Hub
///
/// # Examples
/// - `mbround18/cargo-make:0.37.1` -> `docker.io`
/// - `ghcr.io/org/app:tag` -> `ghcr.io`
/// - `localhost:5000/app` -> `localhost:5000`
pub fn extract_registry(image: &str) -> String {
    let parts: Vec<&str> = image.split('/').collect();

    if parts.len() >= 2 {
        let first = parts[0];
        if first.contains('.') || first.contains(':') || first == "localhost" {
            return first.to_string();
        }
    }

    "docker.io".to_string()
}

/// Keys a login for `registry` may be stored under, preferred first
fn registry_keys(registry: &str) -> Vec<&str> {
    if matches!(registry, "docker.io" | "index.docker.io" | "registry-1.docker.io") {
        vec![DOCKER_HUB_SERVER, "index.docker.io", "docker.io"]
    } else {
        vec![registry]
    }
}

fn decode_auth(auth_b64: &str, registry: &str) -> BuildResult<Option<DockerCredentials>> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(auth_b64.trim())
        .map_err(|e| BuildError::AuthFailed {
            registry: registry.to_string(),
            message: format!("Failed to decode auth: {}", e),
        })?;

    let auth_str = String::from_utf8(decoded).map_err(|e| BuildError::AuthFailed {
        registry: registry.to_string(),
        message: format!("Invalid UTF-8 in auth: {}", e),
    })?;

    Ok(auth_str
        .split_once(':')
        .map(|(username, password)| DockerCredentials {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            serveraddress: Some(registry.to_string()),
            ..Default::default()
        }))
}

/// A configured helper that cannot run is an error, not a missing login
fn run_helper(helper: &str, registry: &str) -> BuildResult<Option<DockerCredentials>> {
    get_from_helper(helper, registry).inspect_err(|e| {
        tracing::warn!(
            "Credential helper docker-credential-{} failed for {}: {}",
            helper,
            registry,
            e
        )
    })
}

fn get_from_helper(helper: &str, registry: &str) -> BuildResult<Option<DockerCredentials>> {
    let helper_cmd = format!("docker-credential-{}", helper);

    let mut child = Command::new(&helper_cmd)
        .arg("get")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| BuildError::AuthFailed {
            registry: registry.to_string(),
            message: format!("Failed to run {}: {}", helper_cmd, e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(registry.as_bytes())
            .map_err(|e| BuildError::AuthFailed {
                registry: registry.to_string(),
                message: format!("Failed to write to {}: {}", helper_cmd, e),
            })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| BuildError::AuthFailed {
            registry: registry.to_string(),
            message: format!("Credential helper failed: {}", e),
        })?;

    if !output.status.success() {
        tracing::debug!(
            "Credential helper returned error for {}: {}",
            registry,
            String::from_utf8_lossy(&output.stderr)
        );
        return Ok(None);
    }

    let response: CredentialResponse =
        serde_json::from_slice(&output.stdout).map_err(|e| BuildError::AuthFailed {
            registry: registry.to_string(),
            message: format!("Failed to parse credential helper response: {}", e),
        })?;

    Ok(Some(DockerCredentials {
        username: Some(response.username),
        password: Some(response.secret),
        serveraddress: Some(registry.to_string()),
        ..Default::default()
    }))
}
