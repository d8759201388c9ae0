//! Asset loading: the manifest of image files and asynchronous texture loads.
//!
//! Images decode on background threads. Each load is a promise with an explicit
//! `Pending` / `Ready` / `Failed` state; renderers keep a placeholder bound until
//! a load turns `Ready`, and keep it forever if the load fails.
//!
//! # Layout
//! The manifest is a small JSON file naming the cube texture and the six
//! skybox faces. Relative paths resolve against the manifest's directory.

pub mod cubemap;
pub mod scene;
pub mod texture;

pub use cubemap::{CubeFace, CubeMapImages, CubeMapLoad};
pub use scene::SceneTextures;
pub use texture::{ImageData, LoadState, TextureLoad, PLACEHOLDER_PIXEL};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("load of {0} was dropped before completing")]
    Canceled(PathBuf),
}

/// Image files used by the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Image applied to every cube face.
    pub cube_texture: PathBuf,
    /// Environment faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub skybox: [PathBuf; 6],
}

impl Default for AssetManifest {
    fn default() -> Self {
        let face = |name: &str| PathBuf::from(format!("assets/skybox/{name}.jpg"));
        Self {
            cube_texture: PathBuf::from("assets/seagull.jpg"),
            skybox: [
                face("right"),
                face("left"),
                face("top"),
                face("bottom"),
                face("front"),
                face("back"),
            ],
        }
    }
}

impl AssetManifest {
    /// Load a manifest and resolve its paths against the manifest's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let manifest: Self = serde_json::from_reader(file)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(manifest.resolve(base))
    }

    /// Save the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Join relative paths onto `base`; absolute paths are kept.
    pub fn resolve(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                base.join(p)
            }
        };
        Self {
            cube_texture: join(&self.cube_texture),
            skybox: [
                join(&self.skybox[0]),
                join(&self.skybox[1]),
                join(&self.skybox[2]),
                join(&self.skybox[3]),
                join(&self.skybox[4]),
                join(&self.skybox[5]),
            ],
        }
    }

    /// Every referenced path, cube texture first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.cube_texture.as_path()).chain(self.skybox.iter().map(PathBuf::as_path))
    }
}

pub fn crate_info() -> &'static str {
    "cubegrid-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_paths() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.cube_texture, PathBuf::from("assets/seagull.jpg"));
        assert_eq!(manifest.skybox[0], PathBuf::from("assets/skybox/right.jpg"));
        assert_eq!(manifest.skybox[5], PathBuf::from("assets/skybox/back.jpg"));
        assert_eq!(manifest.paths().count(), 7);
    }

    #[test]
    fn resolve_joins_relative_paths() {
        let manifest = AssetManifest::default().resolve(Path::new("/srv/scene"));
        assert_eq!(
            manifest.cube_texture,
            PathBuf::from("/srv/scene/assets/seagull.jpg")
        );
        assert!(manifest.paths().all(|p| p.starts_with("/srv/scene")));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let mut manifest = AssetManifest::default();
        manifest.cube_texture = PathBuf::from("/abs/cube.png");
        let resolved = manifest.resolve(Path::new("/base"));
        assert_eq!(resolved.cube_texture, PathBuf::from("/abs/cube.png"));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        AssetManifest::default().save(&path).unwrap();

        let loaded = AssetManifest::load(&path).unwrap();
        assert_eq!(loaded, AssetManifest::default().resolve(dir.path()));
    }

    #[test]
    fn load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AssetManifest::load(&path), Err(AssetError::Json(_))));
    }
}
