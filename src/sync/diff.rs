//! Read-only comparison report

use std::collections::BTreeSet;

use crate::skip::SkipMap;
use crate::version::reconciler::{Reconciler, Reconciliation};
use crate::version::semver::Version;

/// Row status in the comparison table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStatus {
    /// Listed in the skip configuration
    Skipped,
    /// Released but not published
    Missing,
    /// Released and published
    Synced,
    /// Published without a matching release
    Extra,
    /// In neither list; should not happen
    Unknown,
}

impl VersionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Skipped => "Skipped",
            VersionStatus::Missing => "Missing",
            VersionStatus::Synced => "Synced",
            VersionStatus::Extra => "Extra",
            VersionStatus::Unknown => "Unknown",
        }
    }
}

/// Precedence: Skipped > Missing > Synced > Extra > Unknown
pub fn classify(
    in_releases: bool,
    in_published: bool,
    missing: bool,
    skipped: bool,
) -> VersionStatus {
    if skipped {
        VersionStatus::Skipped
    } else if missing {
        VersionStatus::Missing
    } else if in_releases && in_published {
        VersionStatus::Synced
    } else if in_published {
        VersionStatus::Extra
    } else {
        VersionStatus::Unknown
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    pub version: Version,
    pub in_releases: bool,
    pub in_published: bool,
    pub status: VersionStatus,
    /// Skip reason, if any
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub baseline: Version,
    pub rows: Vec<DiffRow>,
    /// Filtered releases present in the skip map
    pub skipped_count: usize,
    /// Missing versions, skip map ignored
    pub missing_count: usize,
    /// Missing versions that are not skipped
    pub available_missing_count: usize,
    pub extra_count: usize,
}

impl DiffReport {
    pub fn all_synced(&self) -> bool {
        self.missing_count == 0
    }
}

/// Lay out the union of filtered releases and published tags, ascending
pub fn build_diff_report(reconciliation: &Reconciliation, skip: &SkipMap) -> DiffReport {
    let releases: BTreeSet<&Version> = reconciliation.releases.iter().collect();
    let missing: BTreeSet<&Version> = reconciliation.missing.iter().collect();
    let all: BTreeSet<&Version> = releases
        .iter()
        .copied()
        .chain(reconciliation.published.iter())
        .collect();

    let rows = all
        .into_iter()
        .map(|version| {
            let in_releases = releases.contains(version);
            let in_published = reconciliation.published.contains(version);
            let note = skip.should_skip(version).map(str::to_string);
            DiffRow {
                version: version.clone(),
                in_releases,
                in_published,
                status: classify(
                    in_releases,
                    in_published,
                    missing.contains(version),
                    note.is_some(),
                ),
                note,
            }
        })
        .collect();

    let skipped_count = reconciliation
        .releases
        .iter()
        .filter(|v| skip.should_skip(v).is_some())
        .count();
    let available_missing_count = reconciliation
        .missing
        .iter()
        .filter(|v| skip.should_skip(v).is_none())
        .count();

    DiffReport {
        baseline: reconciliation.baseline.clone(),
        rows,
        skipped_count,
        missing_count: reconciliation.missing.len(),
        available_missing_count,
        extra_count: reconciliation.extra.len(),
    }
}

/// Reconcile and build the report; `baseline_override` applies to this call only
pub async fn run_diff(
    reconciler: &Reconciler<'_>,
    skip: &SkipMap,
    baseline_override: Option<Version>,
) -> DiffReport {
    let reconciliation = reconciler.reconcile(baseline_override).await;
    build_diff_report(&reconciliation, skip)
}
