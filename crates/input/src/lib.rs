//! Input Tracker: raw device events converted into normalized directives.
//!
//! # Invariants
//! - Pointer moves produce rotation only while a drag is in progress.
//! - Unrecognized keys produce no directive.
//! - The tracker holds pointer state only; offsets live downstream.

pub mod directive;
pub mod event;
pub mod tracker;

pub use directive::{Directive, PanDirection};
pub use event::InputEvent;
pub use tracker::{InputTracker, PointerState};

pub fn crate_info() -> &'static str {
    "modelview-input v0.1.0"
}
