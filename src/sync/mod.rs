//! Report and sync flows built on the reconciler and the dispatcher
//!
//! - [`diff`]: read-only comparison rows and counts
//! - [`plan`]: `--replace` handling and target resolution
//! - [`dispatcher`]: bounded worker pool for build-and-push
//! - [`runner`]: the `sync` and `yank` entry points

pub mod diff;
pub mod dispatcher;
pub mod error;
pub mod plan;
pub mod runner;

pub use diff::{DiffReport, DiffRow, VersionStatus, build_diff_report, run_diff};
pub use dispatcher::{BuildDispatcher, BuildOutcome, BuildSettings, build_and_push};
pub use error::SyncError;
pub use plan::{ReplaceMode, resolve_targets};
pub use runner::{SyncReport, run_sync, yank_image};
