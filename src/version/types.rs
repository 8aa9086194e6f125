//! Common types shared by the registries and the reconciler

use std::collections::BTreeSet;

use crate::version::semver::Version;

/// Raw tag names as returned by a registry, before filtering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageVersions {
    pub versions: Vec<String>,
}

impl PackageVersions {
    pub fn new(versions: Vec<String>) -> Self {
        Self { versions }
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Keep only plain `major.minor.patch` tags, deduplicated
    pub fn into_version_set(self) -> BTreeSet<Version> {
        self.versions
            .iter()
            .filter_map(|tag| Version::parse(tag))
            .collect()
    }
}
