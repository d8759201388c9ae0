//! Shared types for the cube grid viewer: scene configuration, rendering variant,
//! and view selection.
//!
//! # Invariants
//! - Configuration is validated once at load; downstream crates trust it.
//! - Grid dimensions are not configurable; they live in the kernel as constants.

pub mod config;
pub mod types;

pub use config::{ConfigError, LookConfig, ProjectionConfig, SceneConfig, WindowConfig};
pub use types::{Variant, ViewMode};

pub fn crate_info() -> &'static str {
    "cubegrid-common v0.1.0"
}
