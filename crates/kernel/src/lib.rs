//! Scene kernel: shared cube geometry, the fixed grid layout, and the camera model.
//!
//! # Invariants
//! - Grid dimensions and spacing are compile-time constants.
//! - Camera pitch is always within [-pi/2, pi/2].
//! - Nothing here touches a graphics API; every function is testable headless.

pub mod camera;
pub mod grid;
pub mod mesh;

pub use camera::{Camera, LookTuning};
pub use grid::{cells, cube_position, GridCell, CELL_COUNT, CUBE_SPACING, GRID_COLUMNS, GRID_ROWS};
pub use mesh::Mesh;

pub fn crate_info() -> &'static str {
    "cubegrid-kernel v0.1.0"
}
