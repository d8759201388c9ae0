use crate::cubemap::CubeMapLoad;
use crate::texture::{LoadState, TextureLoad};
use crate::AssetManifest;

/// The texture loads one scene needs.
///
/// `cube` is absent for untextured scenes and `skybox` is absent unless the
/// environment map is enabled. Absent loads never start a worker.
#[derive(Debug, Default)]
pub struct SceneTextures {
    pub cube: Option<TextureLoad>,
    pub skybox: Option<CubeMapLoad>,
}

impl SceneTextures {
    pub fn spawn(manifest: &AssetManifest, textured: bool, skybox: bool) -> Self {
        Self {
            cube: textured.then(|| TextureLoad::spawn(&manifest.cube_texture)),
            skybox: skybox.then(|| CubeMapLoad::spawn(&manifest.skybox)),
        }
    }

    /// True once no load is still pending.
    pub fn settled(&self) -> bool {
        let cube = self.cube.as_ref().map(TextureLoad::state);
        let sky = self.skybox.as_ref().map(CubeMapLoad::state);
        [cube, sky]
            .into_iter()
            .flatten()
            .all(|s| s != LoadState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageData;

    #[test]
    fn nothing_requested_is_settled() {
        let textures = SceneTextures::spawn(&AssetManifest::default(), false, false);
        assert!(textures.cube.is_none());
        assert!(textures.skybox.is_none());
        assert!(textures.settled());
    }

    #[test]
    fn settles_after_poll() {
        let mut textures = SceneTextures {
            cube: Some(TextureLoad::from_result("mem", Ok(ImageData::placeholder()))),
            skybox: None,
        };
        assert!(!textures.settled());
        let image = textures.cube.as_mut().and_then(TextureLoad::poll);
        assert_eq!(image, Some(ImageData::placeholder()));
        assert!(textures.settled());
    }
}
