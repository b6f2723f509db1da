//! Viewer kernel: accumulated rotation and camera offsets, and the single
//! controller-owned tick that applies them.
//!
//! # Invariants
//! - `RotationOffset.x` stays within the configured pitch range.
//! - The camera's z coordinate stays within the configured distance range.
//! - All state mutations flow through directives or the tick.

pub mod accumulator;
pub mod controller;
pub mod state;

pub use accumulator::{MoveDirectionFlags, TransformAccumulator};
pub use controller::{Controller, LoadProgress, LoadedModel};
pub use state::ViewerState;

pub fn crate_info() -> &'static str {
    "modelview-kernel v0.1.0"
}
