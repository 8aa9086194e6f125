//! Resolution of the build target list

use crate::sync::error::SyncError;
use crate::version::reconciler::Reconciliation;
use crate::version::semver::Version;

/// Which versions a sync should build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceMode {
    /// Only releases missing from the registry
    Missing,
    /// Every release at or above the baseline, even if already published
    All,
    /// Exactly one release
    Version(Version),
}

impl ReplaceMode {
    /// Interpret the `--replace` argument: absent, `all` (any case) or a
    /// version string. Anything else cannot name a release.
    pub fn from_arg(arg: Option<&str>) -> Result<Self, SyncError> {
        match arg.map(str::trim) {
            None | Some("") => Ok(ReplaceMode::Missing),
            Some(value) if value.eq_ignore_ascii_case("all") => Ok(ReplaceMode::All),
            Some(value) => Version::parse(value)
                .map(ReplaceMode::Version)
                .ok_or_else(|| SyncError::UnknownRelease(value.to_string())),
        }
    }

    pub fn is_replace(&self) -> bool {
        !matches!(self, ReplaceMode::Missing)
    }
}

/// Versions to build for `mode`, before skip filtering, ascending
pub fn resolve_targets(
    mode: &ReplaceMode,
    reconciliation: &Reconciliation,
) -> Result<Vec<Version>, SyncError> {
    match mode {
        ReplaceMode::Missing => Ok(reconciliation.missing.clone()),
        ReplaceMode::All => Ok(reconciliation.releases.clone()),
        ReplaceMode::Version(version) => {
            if reconciliation.releases.binary_search(version).is_ok() {
                Ok(vec![version.clone()])
            } else {
                Err(SyncError::UnknownRelease(version.to_string()))
            }
        }
    }
}
