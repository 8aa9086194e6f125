//! Docker image build, push and removal
//!
//! [`ImageEngine`] is the narrow interface the sync flow depends on;
//! [`DockerEngine`] implements it with bollard against the local daemon.

pub mod auth;
pub mod builder;
pub mod context;
pub mod engine;
pub mod error;
pub mod pusher;

pub use auth::RegistryAuth;
pub use engine::{DockerEngine, ImageEngine};
pub use error::{BuildError, BuildResult, DAEMON_UNAVAILABLE_MESSAGE};
