//! Sync and yank entry points

use crate::events::SyncEvent;
use crate::skip::SkipMap;
use crate::sync::dispatcher::{BuildDispatcher, BuildOutcome};
use crate::sync::error::SyncError;
use crate::sync::plan::{ReplaceMode, resolve_targets};
use crate::version::reconciler::Reconciler;
use crate::version::semver::Version;

/// Everything the build summary needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: ReplaceMode,
    /// Size of the missing set, skip map ignored
    pub missing_count: usize,
    /// Versions handed to the dispatcher
    pub attempted: usize,
    /// Build outcomes, sorted by version
    pub outcomes: Vec<BuildOutcome>,
    /// Versions left out by the skip map, sorted by version
    pub skipped: Vec<(Version, String)>,
}

impl SyncReport {
    /// True when the run stopped before touching the daemon
    pub fn nothing_to_build(&self) -> bool {
        self.attempted == 0
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> Vec<&Version> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| &o.version)
            .collect()
    }
}

/// Resolve targets, drop skipped versions and build the rest.
///
/// Order of checks: unknown `replace` version fails before anything else,
/// an empty target list returns before the daemon is contacted, and an
/// unreachable daemon fails before any build starts.
pub async fn run_sync(
    reconciler: &Reconciler<'_>,
    skip: &SkipMap,
    mode: ReplaceMode,
    dispatcher: &BuildDispatcher,
) -> Result<SyncReport, SyncError> {
    let reconciliation = reconciler.reconcile(None).await;
    let targets = resolve_targets(&mode, &reconciliation)?;

    let (to_build, mut skipped) = skip.partition(targets);
    skipped.sort();
    for (version, reason) in &skipped {
        dispatcher.observer().on_event(&SyncEvent::VersionSkipped {
            version: version.clone(),
            reason: reason.clone(),
        });
    }

    let mut report = SyncReport {
        mode,
        missing_count: reconciliation.missing.len(),
        attempted: to_build.len(),
        outcomes: Vec::new(),
        skipped,
    };

    if to_build.is_empty() {
        return Ok(report);
    }

    report.outcomes = dispatcher.dispatch(to_build).await?;
    Ok(report)
}

/// Remove the local `repo:version` image. Succeeds when it was already gone.
pub async fn yank_image(dispatcher: &BuildDispatcher, version: &Version) -> BuildOutcome {
    let image = dispatcher.settings().image_tag(version);

    match dispatcher.engine().remove(&image).await {
        Ok(existed) => {
            dispatcher.observer().on_event(&SyncEvent::ImageYanked {
                version: version.clone(),
                image,
                existed,
            });
            BuildOutcome::success(version.clone(), "Yanked from local")
        }
        Err(e) => {
            let message = e.user_message();
            dispatcher.observer().on_event(&SyncEvent::BuildFailed {
                version: version.clone(),
                message: message.clone(),
            });
            BuildOutcome::failure(version.clone(), message)
        }
    }
}
