use glam::{Vec2, Vec3};

/// Unit cube, half-extent 0.5. Faces: front, back, top, bottom, right, left.
#[rustfmt::skip]
pub const CUBE_POSITIONS: [f32; 72] = [
    // Front
    -0.5, -0.5,  0.5,
     0.5, -0.5,  0.5,
     0.5,  0.5,  0.5,
    -0.5,  0.5,  0.5,
    // Back
    -0.5, -0.5, -0.5,
     0.5, -0.5, -0.5,
     0.5,  0.5, -0.5,
    -0.5,  0.5, -0.5,
    // Top
    -0.5,  0.5, -0.5,
    -0.5,  0.5,  0.5,
     0.5,  0.5,  0.5,
     0.5,  0.5, -0.5,
    // Bottom
    -0.5, -0.5, -0.5,
    -0.5, -0.5,  0.5,
     0.5, -0.5,  0.5,
     0.5, -0.5, -0.5,
    // Right
     0.5, -0.5, -0.5,
     0.5,  0.5, -0.5,
     0.5,  0.5,  0.5,
     0.5, -0.5,  0.5,
    // Left
    -0.5, -0.5, -0.5,
    -0.5,  0.5, -0.5,
    -0.5,  0.5,  0.5,
    -0.5, -0.5,  0.5,
];

/// Every face maps the full texture: (0,0), (1,0), (1,1), (0,1).
#[rustfmt::skip]
pub const CUBE_TEX_COORDS: [f32; 48] = [
    0.0, 0.0,  1.0, 0.0,  1.0, 1.0,  0.0, 1.0, // Front
    0.0, 0.0,  1.0, 0.0,  1.0, 1.0,  0.0, 1.0, // Back
    0.0, 0.0,  1.0, 0.0,  1.0, 1.0,  0.0, 1.0, // Top
    0.0, 0.0,  1.0, 0.0,  1.0, 1.0,  0.0, 1.0, // Bottom
    0.0, 0.0,  1.0, 0.0,  1.0, 1.0,  0.0, 1.0, // Right
    0.0, 0.0,  1.0, 0.0,  1.0, 1.0,  0.0, 1.0, // Left
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2,     0, 2, 3,     // Front
    4, 5, 6,     4, 6, 7,     // Back
    8, 9, 10,    8, 10, 11,   // Top
    12, 13, 14,  12, 14, 15,  // Bottom
    16, 17, 18,  16, 18, 19,  // Right
    20, 21, 22,  20, 22, 23,  // Left
];

/// Environment cube, half-extent 1.0. Each face is listed in strip order.
#[rustfmt::skip]
pub const SKYBOX_POSITIONS: [f32; 72] = [
    // +Z
    -1.0, -1.0,  1.0,
     1.0, -1.0,  1.0,
    -1.0,  1.0,  1.0,
     1.0,  1.0,  1.0,
    // -Z
    -1.0, -1.0, -1.0,
    -1.0,  1.0, -1.0,
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
    // +Y
    -1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,
     1.0,  1.0, -1.0,
     1.0,  1.0,  1.0,
    // -Y
    -1.0, -1.0, -1.0,
     1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
     1.0, -1.0,  1.0,
    // +X
     1.0, -1.0, -1.0,
     1.0,  1.0, -1.0,
     1.0, -1.0,  1.0,
     1.0,  1.0,  1.0,
    // -X
    -1.0, -1.0, -1.0,
    -1.0, -1.0,  1.0,
    -1.0,  1.0, -1.0,
    -1.0,  1.0,  1.0,
];

/// Strip-ordered quads split as (a, a+1, a+2) and (a+2, a+1, a+3).
#[rustfmt::skip]
pub const SKYBOX_INDICES: [u16; 36] = [
    0, 1, 2,     2, 1, 3,
    4, 5, 6,     6, 5, 7,
    8, 9, 10,    10, 9, 11,
    12, 13, 14,  14, 13, 15,
    16, 17, 18,  18, 17, 19,
    20, 21, 22,  22, 21, 23,
];

/// Read-only view over static mesh arrays. One instance is shared by every grid cell.
#[derive(Debug, Clone, Copy)]
pub struct Mesh {
    pub name: &'static str,
    pub positions: &'static [f32],
    pub tex_coords: Option<&'static [f32]>,
    pub indices: &'static [u16],
}

impl Mesh {
    pub const fn cube() -> Self {
        Self {
            name: "cube",
            positions: &CUBE_POSITIONS,
            tex_coords: Some(&CUBE_TEX_COORDS),
            indices: &CUBE_INDICES,
        }
    }

    pub const fn skybox() -> Self {
        Self {
            name: "skybox",
            positions: &SKYBOX_POSITIONS,
            tex_coords: None,
            indices: &SKYBOX_INDICES,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
    }

    pub fn tex_coord(&self, i: usize) -> Option<Vec2> {
        self.tex_coords
            .map(|uv| Vec2::from_slice(&uv[i * 2..i * 2 + 2]))
    }

    /// Check array shapes and index bounds. Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.positions.len() % 3 != 0 {
            return Err(format!(
                "{}: position array length {} is not a multiple of 3",
                self.name,
                self.positions.len()
            ));
        }
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "{}: index count {} is not a whole number of triangles",
                self.name,
                self.indices.len()
            ));
        }
        let vertex_count = self.vertex_count();
        if let Some(uv) = self.tex_coords {
            if uv.len() != vertex_count * 2 {
                return Err(format!(
                    "{}: {} texcoord floats for {} vertices",
                    self.name,
                    uv.len(),
                    vertex_count
                ));
            }
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(format!(
                "{}: index {} out of range for {} vertices",
                self.name, bad, vertex_count
            ));
        }
        Ok(())
    }
}
