use crate::texture::{ImageData, LoadState, TextureLoad};
use std::path::PathBuf;

/// Cube-map face, in texture-layer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Array layer of this face in a cube texture.
    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Six decoded faces of equal square size.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMapImages {
    pub size: u32,
    pub faces: [ImageData; 6],
}

impl CubeMapImages {
    pub fn placeholder() -> Self {
        Self {
            size: 1,
            faces: std::array::from_fn(|_| ImageData::placeholder()),
        }
    }

    pub fn face(&self, face: CubeFace) -> &ImageData {
        &self.faces[face.layer() as usize]
    }
}

/// Six concurrent face loads that resolve together.
///
/// A cube texture has one size for all layers, so the map is handed out only
/// when every face has arrived and they agree. Any failed face, or a size
/// mismatch, leaves the whole map `Failed`.
#[derive(Debug)]
pub struct CubeMapLoad {
    faces: [TextureLoad; 6],
    arrived: [Option<ImageData>; 6],
    state: LoadState,
}

impl CubeMapLoad {
    /// Start all six face loads. `paths` follow [`CubeFace::ALL`] order.
    pub fn spawn(paths: &[PathBuf; 6]) -> Self {
        Self::from_loads(std::array::from_fn(|i| TextureLoad::spawn(&paths[i])))
    }

    pub fn from_loads(faces: [TextureLoad; 6]) -> Self {
        Self {
            faces,
            arrived: Default::default(),
            state: LoadState::Pending,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn face_state(&self, face: CubeFace) -> LoadState {
        self.faces[face.layer() as usize].state()
    }

    /// Non-blocking check. Returns the complete map the first time it is available.
    pub fn poll(&mut self) -> Option<CubeMapImages> {
        if self.state != LoadState::Pending {
            return None;
        }

        for (load, slot) in self.faces.iter_mut().zip(self.arrived.iter_mut()) {
            if let Some(image) = load.poll() {
                *slot = Some(image);
            }
        }

        if self.faces.iter().any(|f| f.state() == LoadState::Failed) {
            tracing::warn!("skybox face failed to load; keeping placeholder cube map");
            self.state = LoadState::Failed;
            self.arrived = Default::default();
            return None;
        }
        if self.arrived.iter().any(Option::is_none) {
            return None;
        }

        let faces: Vec<ImageData> = self.arrived.iter_mut().filter_map(Option::take).collect();
        let size = faces[0].width;
        if let Some(bad) = faces.iter().find(|f| f.width != size || f.height != size) {
            tracing::warn!(
                expected = size,
                width = bad.width,
                height = bad.height,
                "skybox faces must be square and equal-sized; keeping placeholder cube map"
            );
            self.state = LoadState::Failed;
            return None;
        }

        let faces: [ImageData; 6] = faces.try_into().ok()?;
        self.state = LoadState::Ready;
        tracing::debug!(size, "skybox cube map ready");
        Some(CubeMapImages { size, faces })
    }
}
