//! Progress events emitted by the reconciler, skip filter and dispatcher
//!
//! Core logic never logs directly; it reports [`SyncEvent`]s to a
//! [`SyncObserver`]. The binary installs [`TracingObserver`], tests install
//! a recorder and assert on the events instead of captured output.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::version::registry::SourceKind;
use crate::version::semver::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A version source could not be listed; it is treated as empty
    SourceUnavailable { source: SourceKind, error: String },
    /// A version source was listed successfully
    SourceListed { source: SourceKind, count: usize },
    /// Baseline in effect for this run
    BaselineSelected { baseline: Version, manual: bool },
    /// Skip configuration loaded
    SkipConfigLoaded { path: PathBuf, entries: usize },
    /// No skip configuration file present
    SkipConfigMissing { path: PathBuf },
    /// Skip configuration present but unreadable; treated as empty
    SkipConfigInvalid { path: PathBuf, error: String },
    /// A version was left out of the build list
    VersionSkipped { version: Version, reason: String },
    BuildStarted { version: Version, image: String },
    PushStarted { version: Version, image: String },
    BuildSucceeded { version: Version, image: String },
    BuildFailed { version: Version, message: String },
    /// The container engine did not answer the reachability check
    DaemonUnavailable { error: String },
    ImageYanked { version: Version, image: String, existed: bool },
}

/// Receiver for [`SyncEvent`]s
pub trait SyncObserver: Send + Sync {
    fn on_event(&self, event: &SyncEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::SourceUnavailable { source, error } => {
                warn!("Error fetching {}: {}", source.as_str(), error)
            }
            SyncEvent::SourceListed { source, count } => {
                info!("Fetched {} {}", count, source.as_str())
            }
            SyncEvent::BaselineSelected { baseline, manual } => {
                if *manual {
                    info!("Using manual baseline version: {}", baseline)
                } else {
                    info!("Using baseline version: {}", baseline)
                }
            }
            SyncEvent::SkipConfigLoaded { path, entries } => {
                info!(
                    "Loaded skip config with {} entries from {}",
                    entries,
                    path.display()
                )
            }
            SyncEvent::SkipConfigMissing { path } => {
                info!("No skip config found at {}", path.display())
            }
            SyncEvent::SkipConfigInvalid { path, error } => {
                warn!("Could not load skip config {}: {}", path.display(), error)
            }
            SyncEvent::VersionSkipped { version, reason } => {
                warn!("Skipping {}: {}", version, reason)
            }
            SyncEvent::BuildStarted { image, .. } => info!("Building {}...", image),
            SyncEvent::PushStarted { image, .. } => info!("Pushing {}...", image),
            SyncEvent::BuildSucceeded { image, .. } => {
                info!("Successfully built and pushed {}", image)
            }
            SyncEvent::BuildFailed { version, message } => {
                error!("Failed to build/push {}: {}", version, message)
            }
            SyncEvent::DaemonUnavailable { error } => {
                error!("Docker daemon not accessible: {}", error)
            }
            SyncEvent::ImageYanked { image, existed, .. } => {
                if *existed {
                    info!("Yanked local image {}", image)
                } else {
                    info!("Local image {} was not present", image)
                }
            }
        }
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn on_event(&self, _event: &SyncEvent) {}
}
