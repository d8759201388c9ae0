//! Rendering Adapter: the per-frame loop and a renderer-agnostic interface.
//!
//! # Invariants
//! - One frame tick applies at most one buffered mouse-look delta.
//! - Every tick plans exactly one indexed cube draw per grid cell, row-major.
//! - Backends consume [`FramePlan`]s; they never mutate the camera.

mod frame;
mod renderer;
mod timer;

pub use frame::{aspect_ratio, DrawCall, FrameLoop, FramePlan, Projection};
pub use renderer::{DebugTextRenderer, Renderer};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "cubegrid-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
