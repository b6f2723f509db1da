//! Shared types and configuration for the model viewer.
//!
//! # Invariants
//! - Clamp ranges are closed and non-inverted once a config has been validated.

pub mod config;
pub mod types;

pub use config::{CameraConfig, ConfigError, InputConfig, LightConfig, ViewerConfig};
pub use types::{ClosedRange, RotationOffset, Transform};

pub fn crate_info() -> &'static str {
    "modelview-common v0.1.0"
}
