use cubegrid_assets::{CubeFace, CubeMapImages, ImageData};

/// Whether a 2D image can be created on a device with these limits.
pub fn fits_limits(image: &ImageData, limits: &wgpu::Limits) -> bool {
    image.width > 0
        && image.height > 0
        && image.width <= limits.max_texture_dimension_2d
        && image.height <= limits.max_texture_dimension_2d
}

/// Whether a six-layer cube texture of this face size fits the device.
pub fn cube_fits_limits(images: &CubeMapImages, limits: &wgpu::Limits) -> bool {
    images.size > 0
        && images.size <= limits.max_texture_dimension_2d
        && CubeFace::ALL.len() as u32 <= limits.max_texture_array_layers
}

/// A sampled texture with its view and sampler.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload a 2D RGBA8 image with a full mip chain.
    ///
    /// Callers check [`fits_limits`] first; oversized images fail validation.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: image.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_mips(queue, &texture, image, 0);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_sampler(device, label);
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// The 1x1 blue stand-in bound until a real image arrives.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_image(device, queue, &ImageData::placeholder(), "placeholder_texture")
    }

    /// Upload six square faces as one cube texture, each with a full mip chain.
    pub fn cube_from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: &CubeMapImages,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: images.size,
                height: images.size,
                depth_or_array_layers: 6,
            },
            mip_level_count: images.face(CubeFace::PositiveX).mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for face in CubeFace::ALL {
            write_mips(queue, &texture, images.face(face), face.layer());
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = create_sampler(device, label);
        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn placeholder_cube(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::cube_from_images(
            device,
            queue,
            &CubeMapImages::placeholder(),
            "placeholder_cube_texture",
        )
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.texture.size();
        (size.width, size.height)
    }
}

/// Write every mip level of `image` into array layer `layer`.
fn write_mips(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &ImageData, layer: u32) {
    for (mip_level, level) in (0u32..).zip(image.mip_chain()) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &level.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(level.bytes_per_row()),
                rows_per_image: Some(level.height),
            },
            wgpu::Extent3d {
                width: level.width,
                height: level.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// Trilinear sampling, clamped at the edges.
fn create_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
