use std::path::PathBuf;
use thiserror::Error;

/// Message shown whenever the daemon cannot be reached at all
pub const DAEMON_UNAVAILABLE_MESSAGE: &str = "Docker daemon not running or accessible";

/// Fragments of connection-level failures, matched case-insensitively
const UNREACHABLE_MARKERS: &[&str] = &[
    "connection refused",
    "connection aborted",
    "connection reset",
    "no such file or directory",
    "socket not found",
    "error trying to connect",
];

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Invalid tag: {tag}")]
    InvalidTag { tag: String },

    #[error("Authentication failed for {registry}: {message}")]
    AuthFailed { registry: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// True when the failure means the daemon itself is unreachable
    pub fn is_daemon_unreachable(&self) -> bool {
        match self {
            BuildError::DockerConnection(_) | BuildError::PushFailed { .. } => {
                let text = self.to_string().to_lowercase();
                UNREACHABLE_MARKERS.iter().any(|m| text.contains(m))
            }
            _ => false,
        }
    }

    /// Message recorded in a build outcome
    pub fn user_message(&self) -> String {
        if self.is_daemon_unreachable() {
            return DAEMON_UNAVAILABLE_MESSAGE.to_string();
        }
        match self {
            BuildError::BuildFailed(msg) => msg.trim().to_string(),
            BuildError::PushFailed { message } => message.trim().to_string(),
            _ => self.to_string(),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
