//! Bounded worker pool running build-and-push operations

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

use crate::config::{MAX_CONCURRENT_BUILDS, SyncConfig};
use crate::docker::engine::ImageEngine;
use crate::events::{SyncEvent, SyncObserver};
use crate::sync::error::SyncError;
use crate::version::semver::{Version, strip_v_prefix};

/// Result of one build-and-push attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub version: Version,
    pub success: bool,
    pub message: String,
}

impl BuildOutcome {
    pub fn success(version: Version, message: impl Into<String>) -> Self {
        Self {
            version,
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(version: Version, message: impl Into<String>) -> Self {
        Self {
            version,
            success: false,
            message: message.into(),
        }
    }
}

/// What every build needs to know besides the version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub image_repo: String,
    pub build_arg: String,
}

impl BuildSettings {
    pub fn image_tag(&self, version: &Version) -> String {
        format!("{}:{}", self.image_repo, version)
    }
}

impl From<&SyncConfig> for BuildSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            image_repo: config.image_repo.clone(),
            build_arg: config.build_arg.clone(),
        }
    }
}

/// Build `repo:version` with the version as build argument, then push it.
///
/// Never fails: every error becomes a failed [`BuildOutcome`].
pub async fn build_and_push(
    engine: &dyn ImageEngine,
    settings: &BuildSettings,
    version: &Version,
    observer: &dyn SyncObserver,
) -> BuildOutcome {
    let tag = version.to_string();
    let image = settings.image_tag(version);

    observer.on_event(&SyncEvent::BuildStarted {
        version: version.clone(),
        image: image.clone(),
    });

    let build_args = HashMap::from([(
        settings.build_arg.clone(),
        strip_v_prefix(&tag).to_string(),
    )]);

    let result = async {
        engine.build(&image, build_args).await?;
        observer.on_event(&SyncEvent::PushStarted {
            version: version.clone(),
            image: image.clone(),
        });
        engine.push(&settings.image_repo, &tag).await
    }
    .await;

    match result {
        Ok(()) => {
            observer.on_event(&SyncEvent::BuildSucceeded {
                version: version.clone(),
                image,
            });
            BuildOutcome::success(version.clone(), "Success")
        }
        Err(e) => {
            let message = e.user_message();
            observer.on_event(&SyncEvent::BuildFailed {
                version: version.clone(),
                message: message.clone(),
            });
            BuildOutcome::failure(version.clone(), message)
        }
    }
}

/// Runs independent builds with at most `max_concurrent` in flight.
///
/// There is no retry, timeout or cancellation: each submitted version is
/// attempted exactly once and the call returns when all have finished.
pub struct BuildDispatcher {
    engine: Arc<dyn ImageEngine>,
    settings: Arc<BuildSettings>,
    observer: Arc<dyn SyncObserver>,
    max_concurrent: usize,
}

impl BuildDispatcher {
    pub fn new(
        engine: Arc<dyn ImageEngine>,
        settings: BuildSettings,
        observer: Arc<dyn SyncObserver>,
    ) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
            observer,
            max_concurrent: MAX_CONCURRENT_BUILDS,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn observer(&self) -> &dyn SyncObserver {
        self.observer.as_ref()
    }

    pub fn engine(&self) -> &dyn ImageEngine {
        self.engine.as_ref()
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Fails once, up front, if the daemon cannot be reached
    pub async fn check_daemon(&self) -> Result<(), SyncError> {
        self.engine.ping().await.map_err(|e| {
            let error = e.to_string();
            self.observer.on_event(&SyncEvent::DaemonUnavailable {
                error: error.clone(),
            });
            SyncError::DaemonUnavailable(error)
        })
    }

    /// Check the daemon, then build every version.
    ///
    /// Outcomes are collected as builds finish and returned sorted by
    /// version. Duplicate input versions are built once.
    pub async fn dispatch(&self, versions: Vec<Version>) -> Result<Vec<BuildOutcome>, SyncError> {
        self.check_daemon().await?;
        Ok(self.run_pool(versions).await)
    }

    async fn run_pool(&self, versions: Vec<Version>) -> Vec<BuildOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set = JoinSet::new();
        let mut pending = BTreeSet::new();

        for version in versions {
            if !pending.insert(version.clone()) {
                continue;
            }

            let semaphore = Arc::clone(&semaphore);
            let engine = Arc::clone(&self.engine);
            let settings = Arc::clone(&self.settings);
            let observer = Arc::clone(&self.observer);

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                build_and_push(engine.as_ref(), &settings, &version, observer.as_ref()).await
            });
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => {
                    pending.remove(&outcome.version);
                    outcomes.push(outcome);
                }
                Err(e) => error!("build task did not complete: {}", e),
            }
        }

        // Tasks that panicked still get exactly one outcome.
        for version in pending {
            let message = "build task aborted unexpectedly".to_string();
            self.observer.on_event(&SyncEvent::BuildFailed {
                version: version.clone(),
                message: message.clone(),
            });
            outcomes.push(BuildOutcome::failure(version, message));
        }

        outcomes.sort_by(|a, b| a.version.cmp(&b.version));
        outcomes
    }
}
