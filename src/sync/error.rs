use thiserror::Error;

/// Errors that abort a whole sync invocation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Version {0} not found in GitHub releases")]
    UnknownRelease(String),

    #[error("Cannot proceed without Docker daemon: {0}")]
    DaemonUnavailable(String),
}
