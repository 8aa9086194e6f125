//! Reconciliation of upstream releases against published image tags

use std::collections::BTreeSet;

use crate::events::{SyncEvent, SyncObserver};
use crate::version::registry::Registry;
use crate::version::semver::Version;

/// Outcome of one reconciliation run. Every sequence is sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Baseline in effect (computed or manual)
    pub baseline: Version,
    /// Releases at or above the baseline
    pub releases: Vec<Version>,
    /// Every published tag, regardless of baseline
    pub published: BTreeSet<Version>,
    /// Filtered releases absent from the published tags
    pub missing: Vec<Version>,
    /// Published tags with no matching release
    pub extra: Vec<Version>,
}

/// Compares the releases of one upstream repository with the tags of one
/// image repository.
pub struct Reconciler<'a> {
    releases: &'a dyn Registry,
    upstream_repo: &'a str,
    tags: &'a dyn Registry,
    image_repo: &'a str,
    observer: &'a dyn SyncObserver,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        releases: &'a dyn Registry,
        upstream_repo: &'a str,
        tags: &'a dyn Registry,
        image_repo: &'a str,
        observer: &'a dyn SyncObserver,
    ) -> Self {
        Self {
            releases,
            upstream_repo,
            tags,
            image_repo,
            observer,
        }
    }

    /// Lists upstream releases. Fails open: an unreachable source yields an
    /// empty set and a `SourceUnavailable` event.
    pub async fn list_releases(&self) -> BTreeSet<Version> {
        list_versions(self.releases, self.upstream_repo, self.observer).await
    }

    /// Lists published image tags. Fails open like [`Self::list_releases`].
    pub async fn list_published_tags(&self) -> BTreeSet<Version> {
        list_versions(self.tags, self.image_repo, self.observer).await
    }

    /// Fetches both sources (sequentially) and computes the comparison.
    ///
    /// `baseline_override` replaces the computed baseline for this call only.
    pub async fn reconcile(&self, baseline_override: Option<Version>) -> Reconciliation {
        let releases = self.list_releases().await;
        let published = self.list_published_tags().await;

        let manual = baseline_override.is_some();
        let baseline = baseline_override.unwrap_or_else(|| compute_baseline(&published));
        if manual || !published.is_empty() {
            self.observer.on_event(&SyncEvent::BaselineSelected {
                baseline: baseline.clone(),
                manual,
            });
        }

        compare(&releases, published, baseline)
    }
}

async fn list_versions(
    registry: &dyn Registry,
    repository: &str,
    observer: &dyn SyncObserver,
) -> BTreeSet<Version> {
    let source = registry.source_kind();
    match registry.fetch_all_versions(repository).await {
        Ok(raw) => {
            let versions = raw.into_version_set();
            observer.on_event(&SyncEvent::SourceListed {
                source,
                count: versions.len(),
            });
            versions
        }
        Err(e) => {
            observer.on_event(&SyncEvent::SourceUnavailable {
                source,
                error: e.to_string(),
            });
            BTreeSet::new()
        }
    }
}

/// Smallest published version, or `0.0.0` when nothing is published
pub fn compute_baseline(published: &BTreeSet<Version>) -> Version {
    published.first().cloned().unwrap_or(Version::ZERO)
}

/// Pure set arithmetic behind [`Reconciler::reconcile`]
pub fn compare(
    releases: &BTreeSet<Version>,
    published: BTreeSet<Version>,
    baseline: Version,
) -> Reconciliation {
    let filtered: Vec<Version> = releases.range(baseline.clone()..).cloned().collect();
    let missing = filtered
        .iter()
        .filter(|v| !published.contains(*v))
        .cloned()
        .collect();
    let extra = published.difference(releases).cloned().collect();

    Reconciliation {
        baseline,
        releases: filtered,
        published,
        missing,
        extra,
    }
}
