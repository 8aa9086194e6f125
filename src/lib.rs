pub mod config;
pub mod docker;
pub mod events;
pub mod render;
pub mod skip;
pub mod sync;
pub mod version;
