use crate::AssetError;
use futures::channel::oneshot;
use std::path::{Path, PathBuf};

/// Solid blue shown until a texture finishes loading.
pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// 1x1 placeholder.
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: PLACEHOLDER_PIXEL.to_vec(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Read and decode an image file (blocking).
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes).map_err(|e| AssetError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    /// Levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        u32::BITS - self.width.max(self.height).max(1).leading_zeros()
    }

    /// The image followed by each successively halved level, box-filtered
    /// from the full-size image.
    pub fn mip_chain(&self) -> Vec<ImageData> {
        let mut levels = vec![self.clone()];
        let Some(base) = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
        else {
            return levels;
        };
        for level in 1..self.mip_level_count() {
            let width = (self.width >> level).max(1);
            let height = (self.height >> level).max(1);
            let resized =
                image::imageops::resize(&base, width, height, image::imageops::FilterType::Triangle);
            levels.push(ImageData {
                width,
                height,
                rgba: resized.into_raw(),
            });
        }
        levels
    }
}

/// Where a texture load stands. The placeholder is shown in every state but `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed,
}

type LoadResult = Result<ImageData, AssetError>;

/// An image decoding on a background thread.
///
/// [`TextureLoad::poll`] hands the decoded image out exactly once, when it
/// arrives. Failures are logged once and leave the load in `Failed`.
#[derive(Debug)]
pub struct TextureLoad {
    path: PathBuf,
    receiver: Option<oneshot::Receiver<LoadResult>>,
    state: LoadState,
}

impl TextureLoad {
    /// Start decoding `path` on a named worker thread.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = oneshot::channel();
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("texture-load".into())
            .spawn(move || {
                let _ = tx.send(ImageData::load(&worker_path));
            });
        // A failed spawn drops the sender, so the receiver reports cancellation.
        if let Err(e) = spawned {
            tracing::warn!(path = %path.display(), error = %e, "could not start texture loader");
        }
        tracing::debug!(path = %path.display(), "texture load started");
        Self {
            path,
            receiver: Some(rx),
            state: LoadState::Pending,
        }
    }

    /// A load whose outcome is already known.
    pub fn from_result(path: impl Into<PathBuf>, result: Result<ImageData, AssetError>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self {
            path: path.into(),
            receiver: Some(rx),
            state: LoadState::Pending,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Non-blocking check. Returns the image the first time it is available.
    pub fn poll(&mut self) -> Option<ImageData> {
        let receiver = self.receiver.as_mut()?;
        let outcome = match receiver.try_recv() {
            Ok(None) => return None,
            Ok(Some(result)) => result,
            Err(oneshot::Canceled) => Err(AssetError::Canceled(self.path.clone())),
        };
        self.receiver = None;
        match outcome {
            Ok(image) => {
                tracing::debug!(
                    path = %self.path.display(),
                    width = image.width,
                    height = image.height,
                    "texture ready"
                );
                self.state = LoadState::Ready;
                Some(image)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "texture load failed; keeping placeholder");
                self.state = LoadState::Failed;
                None
            }
        }
    }

    /// Block until the load finishes.
    pub fn wait(mut self) -> Result<ImageData, AssetError> {
        match self.receiver.take() {
            Some(rx) => futures::executor::block_on(rx)
                .map_err(|_| AssetError::Canceled(self.path.clone()))?,
            None => Err(AssetError::Canceled(self.path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn poll_until_settled(load: &mut TextureLoad) -> Option<ImageData> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Some(image) = load.poll() {
                return Some(image);
            }
            if load.state() != LoadState::Pending {
                return None;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("texture load did not settle");
    }

    #[test]
    fn placeholder_is_one_blue_pixel() {
        let p = ImageData::placeholder();
        assert_eq!((p.width, p.height), (1, 1));
        assert_eq!(p.rgba, vec![0, 0, 255, 255]);
        assert_eq!(p.bytes_per_row(), 4);
    }

    #[test]
    fn mip_chain_halves_to_one_pixel() {
        let image = ImageData {
            width: 8,
            height: 4,
            rgba: [10, 20, 30, 255].repeat(32),
        };
        assert_eq!(image.mip_level_count(), 4);
        let sizes: Vec<_> = image.mip_chain().iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
        let last = image.mip_chain().pop().unwrap();
        assert_eq!(last.rgba.len(), 4);
        for (got, want) in last.rgba.iter().zip([10u8, 20, 30, 255]) {
            assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
        }
    }

    #[test]
    fn placeholder_has_single_level() {
        let p = ImageData::placeholder();
        assert_eq!(p.mip_level_count(), 1);
        assert_eq!(p.mip_chain(), vec![p.clone()]);
    }

    #[test]
    fn spawned_load_becomes_ready_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "cube.png", 4, 2);

        let mut load = TextureLoad::spawn(&path);
        let image = poll_until_settled(&mut load).expect("image should load");
        assert_eq!((image.width, image.height), (4, 2));
        assert_eq!(image.rgba.len(), 4 * 2 * 4);
        assert_eq!(&image.rgba[..4], &[200, 10, 10, 255]);
        assert_eq!(load.state(), LoadState::Ready);
        assert_eq!(load.poll(), None);
    }

    #[test]
    fn missing_file_fails_and_stays_failed() {
        let mut load = TextureLoad::spawn("/no/such/texture.jpg");
        assert_eq!(poll_until_settled(&mut load), None);
        assert_eq!(load.state(), LoadState::Failed);
        assert_eq!(load.poll(), None);
        assert_eq!(load.state(), LoadState::Failed);
    }

    #[test]
    fn undecodable_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"not an image").unwrap();
        let err = ImageData::load(&path).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn from_result_resolves_on_first_poll() {
        let mut load = TextureLoad::from_result("mem", Ok(ImageData::placeholder()));
        assert_eq!(load.state(), LoadState::Pending);
        assert_eq!(load.poll(), Some(ImageData::placeholder()));
        assert_eq!(load.state(), LoadState::Ready);
    }

    #[test]
    fn wait_blocks_for_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "sky.png", 2, 2);
        let image = TextureLoad::spawn(&path).wait().unwrap();
        assert_eq!(image.width, 2);
    }
}
