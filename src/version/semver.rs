use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A release version of the form `major.minor.patch`.
///
/// Only plain three-component numeric identifiers are accepted: pre-release
/// and build metadata (`1.2.3-beta`, `1.2.3+sha`), prefixes (`v1.2.3`),
/// partial versions (`1.2`) and leading zeros (`01.2.3`) are rejected, so
/// formatting a parsed value always yields the original string.
///
/// Ordering is numeric per component, so `2.0.0 < 10.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(semver::Version);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a major.minor.patch version: {0:?}")]
pub struct VersionParseError(pub String);

impl Version {
    /// Baseline used when nothing has been published yet
    pub const ZERO: Version = Version(semver::Version::new(0, 0, 0));

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a tag, returning `None` for anything that is not a plain version
    pub fn parse(tag: &str) -> Option<Self> {
        let parsed = semver::Version::parse(tag).ok()?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return None;
        }
        Some(Self(parsed))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VersionParseError(s.to_string()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0.major, self.0.minor, self.0.patch)
    }
}

/// Strip a leading `v` from a tag, e.g. for use as a build argument
pub fn strip_v_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}
