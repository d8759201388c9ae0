//! wgpu render backend for the cube grid.
//!
//! Draws the shared cube mesh once per grid cell, each draw with its own
//! model-view matrix, plus an optional cube-map skybox at the far plane.
//! Textures start as 1x1 placeholders and are swapped in as loads finish.
//!
//! # Invariants
//! - The renderer never mutates the frame loop; it only consumes a `FramePlan`.
//! - A shader that fails validation aborts construction with `GpuError::Shader`.

mod context;
mod gpu;
mod shaders;
mod texture;

pub use context::GpuContext;
pub use gpu::{CubeGridRenderer, RenderOptions};
pub use shaders::{CUBE_SHADER, SKYBOX_SHADER};
pub use texture::{cube_fits_limits, fits_limits, GpuTexture};

/// Errors raised while bringing up or driving the GPU.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("shader failed to compile or link: {0}")]
    Shader(String),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
