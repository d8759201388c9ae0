use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const GRID_ROWS: u32 = 25;
pub const GRID_COLUMNS: u32 = 25;
/// Distance between neighbouring cube centers; cubes are 1.0 wide so they never touch.
pub const CUBE_SPACING: f32 = 1.2;
pub const CELL_COUNT: usize = (GRID_ROWS * GRID_COLUMNS) as usize;

/// World-space center of the cube at `(row, column)`.
///
/// Rows run along X and columns along Z; the grid is centered on the origin
/// and sits on the `y = 0` plane.
pub fn cube_position(row: u32, column: u32) -> Vec3 {
    let x = (row as f32 - GRID_ROWS as f32 / 2.0) * CUBE_SPACING;
    let z = (column as f32 - GRID_COLUMNS as f32 / 2.0) * CUBE_SPACING;
    Vec3::new(x, 0.0, z)
}

/// A cell of the grid. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub row: u32,
    pub column: u32,
}

impl GridCell {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    pub fn position(self) -> Vec3 {
        cube_position(self.row, self.column)
    }

    /// Row-major index of this cell, matching the order of [`cells`].
    pub fn index(self) -> usize {
        (self.row * GRID_COLUMNS + self.column) as usize
    }
}

/// All grid cells, row-major (row outer, column inner).
pub fn cells() -> impl Iterator<Item = GridCell> {
    (0..GRID_ROWS).flat_map(|row| (0..GRID_COLUMNS).map(move |column| GridCell { row, column }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_cell_matches_closed_form() {
        for row in 0..GRID_ROWS {
            for column in 0..GRID_COLUMNS {
                let expected = Vec3::new(
                    (row as f32 - 12.5) * 1.2,
                    0.0,
                    (column as f32 - 12.5) * 1.2,
                );
                assert!(cube_position(row, column).abs_diff_eq(expected, 1e-5));
            }
        }
    }

    #[test]
    fn corner_cells() {
        assert!(cube_position(0, 0).abs_diff_eq(Vec3::new(-15.0, 0.0, -15.0), 1e-5));
        assert!(cube_position(24, 24).abs_diff_eq(Vec3::new(13.8, 0.0, 13.8), 1e-5));
    }

    #[test]
    fn position_is_pure() {
        let a = cube_position(7, 19);
        let b = cube_position(7, 19);
        assert_eq!(a, b);
        assert_eq!(GridCell::new(7, 19).position(), a);
    }

    #[test]
    fn cells_are_row_major_and_complete() {
        let all: Vec<GridCell> = cells().collect();
        assert_eq!(all.len(), CELL_COUNT);
        assert_eq!(all[0], GridCell::new(0, 0));
        assert_eq!(all[1], GridCell::new(0, 1));
        assert_eq!(all[25], GridCell::new(1, 0));
        assert_eq!(all[CELL_COUNT - 1], GridCell::new(24, 24));
        for (i, cell) in all.iter().enumerate() {
            assert_eq!(cell.index(), i);
        }
    }

    #[test]
    fn neighbours_are_spaced_apart() {
        let a = cube_position(3, 3);
        let b = cube_position(4, 3);
        let c = cube_position(3, 4);
        assert!(((b.x - a.x) - CUBE_SPACING).abs() < 1e-5);
        assert!(((c.z - a.z) - CUBE_SPACING).abs() < 1e-5);
        assert_eq!(a.y, 0.0);
    }
}
