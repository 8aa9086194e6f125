//! Version listing and reconciliation
//!
//! This module fetches the two version lists (upstream GitHub releases and
//! published Docker Hub tags) and compares them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │ Credentials │────▶│  Registry   │────▶│    Reconciler    │
//! │ (gh token)  │     │  (fetch)    │     │ (baseline, diff) │
//! └─────────────┘     └─────────────┘     └──────────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Registries  │
//!                     │(github, hub)│
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`credentials`]: GitHub token discovery (env var, `gh` CLI)
//! - [`reconciler`]: Baseline, missing and extra computation
//! - [`registry`]: Registry trait for fetching tags from remote sources
//! - [`registries`]: GitHub Releases and Docker Hub implementations
//! - [`error`]: Error type for registry operations
//! - [`semver`]: The `major.minor.patch` version type
//! - [`types`]: Raw tag lists

pub mod credentials;
pub mod error;
pub mod reconciler;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;

pub use reconciler::{Reconciler, Reconciliation, compute_baseline};
pub use semver::Version;
