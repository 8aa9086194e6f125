//! Skip list: versions that must never be built, with a reason
//!
//! The file is a flat JSON object, e.g. `{"0.32.0": "upstream build broken"}`.
//! Keys are matched exactly against version strings; there is no range or
//! wildcard syntax.

use std::path::Path;

use indexmap::IndexMap;

use crate::events::{SyncEvent, SyncObserver};
use crate::version::semver::Version;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipMap {
    entries: IndexMap<String, String>,
}

impl SkipMap {
    pub fn new(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }

    /// Returns the skip reason if `version` is listed
    pub fn should_skip(&self, version: &Version) -> Option<&str> {
        self.entries
            .get(version.to_string().as_str())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Splits `versions` into those to keep and those skipped (with reason).
    /// Relative order is preserved on both sides.
    pub fn partition(&self, versions: Vec<Version>) -> (Vec<Version>, Vec<(Version, String)>) {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for version in versions {
            match self.should_skip(&version) {
                Some(reason) => {
                    let reason = reason.to_string();
                    skipped.push((version, reason));
                }
                None => kept.push(version),
            }
        }

        (kept, skipped)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SkipMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Loads the skip configuration.
///
/// A missing file yields an empty map. An unreadable or malformed file is
/// reported through the observer and also yields an empty map; loading
/// never aborts the run.
pub fn load_skip_map(path: &Path, observer: &dyn SyncObserver) -> SkipMap {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            observer.on_event(&SyncEvent::SkipConfigMissing {
                path: path.to_path_buf(),
            });
            return SkipMap::default();
        }
        Err(e) => {
            observer.on_event(&SyncEvent::SkipConfigInvalid {
                path: path.to_path_buf(),
                error: e.to_string(),
            });
            return SkipMap::default();
        }
    };

    match serde_json::from_str::<IndexMap<String, String>>(&content) {
        Ok(entries) => {
            observer.on_event(&SyncEvent::SkipConfigLoaded {
                path: path.to_path_buf(),
                entries: entries.len(),
            });
            SkipMap::new(entries)
        }
        Err(e) => {
            observer.on_event(&SyncEvent::SkipConfigInvalid {
                path: path.to_path_buf(),
                error: e.to_string(),
            });
            SkipMap::default()
        }
    }
}
