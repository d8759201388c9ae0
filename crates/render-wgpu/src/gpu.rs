use crate::shaders;
use crate::texture::{cube_fits_limits, fits_limits, GpuTexture};
use crate::GpuError;
use bytemuck::{Pod, Zeroable};
use cubegrid_assets::{CubeMapLoad, SceneTextures, TextureLoad};
use cubegrid_common::{SceneConfig, Variant};
use cubegrid_kernel::{Mesh, CELL_COUNT};
use cubegrid_render::FramePlan;
use glam::{Mat3, Mat4};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    projection: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    model_view: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SkyUniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CubeVertex {
    position: [f32; 3],
    tex_coord: [f32; 2],
}

/// Interleave positions with texture coordinates; untextured meshes get (0, 0).
fn cube_vertices(mesh: &Mesh) -> Vec<CubeVertex> {
    (0..mesh.vertex_count())
        .map(|i| CubeVertex {
            position: mesh.position(i).to_array(),
            tex_coord: mesh.tex_coord(i).map_or([0.0, 0.0], |t| t.to_array()),
        })
        .collect()
}

/// Byte stride between per-draw uniforms, rounded up to the device's dynamic offset alignment.
fn draw_stride(alignment: u32) -> u64 {
    wgpu::util::align_to(
        std::mem::size_of::<DrawUniforms>() as u64,
        u64::from(alignment.max(1)),
    )
}

/// Projection times the view with its translation removed, so the sky stays put.
fn sky_view_projection(plan: &FramePlan) -> Mat4 {
    plan.projection * Mat4::from_mat3(Mat3::from_mat4(plan.view))
}

/// What the backend draws, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub variant: Variant,
    pub skybox: bool,
    pub clear_color: [f32; 4],
    pub flat_color: [f32; 4],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&SceneConfig::default())
    }
}

impl From<&SceneConfig> for RenderOptions {
    fn from(config: &SceneConfig) -> Self {
        Self {
            variant: config.variant,
            skybox: config.skybox,
            clear_color: config.clear_color,
            flat_color: config.flat_color,
        }
    }
}

struct Skybox {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    texture: GpuTexture,
}

/// wgpu renderer for the cube grid.
pub struct CubeGridRenderer {
    options: RenderOptions,
    cube_pipeline: wgpu::RenderPipeline,
    frame_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_texture: GpuTexture,
    skybox: Option<Skybox>,
    depth_texture: wgpu::TextureView,
}

impl CubeGridRenderer {
    /// Build pipelines, buffers and placeholder textures.
    ///
    /// Shader modules and pipelines are created inside a validation error
    /// scope; any error there is returned as [`GpuError::Shader`].
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        options: &RenderOptions,
    ) -> Result<Self, GpuError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &texture_layout_entries(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                wgpu::TextureViewDimension::D2,
            ),
        });

        let draw_stride = draw_stride(device.limits().min_uniform_buffer_offset_alignment);
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });
        let cube_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout],
            push_constant_ranges: &[],
        });
        let fragment_entry = if options.variant.is_textured() {
            "fs_textured"
        } else {
            "fs_flat"
        };

        let cube_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&cube_layout),
            vertex: wgpu::VertexState {
                module: &cube_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CubeVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cube_shader,
                entry_point: Some(fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Face winding of the cube data is not consistent, so nothing is culled.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let skybox = if options.skybox {
            Some(Skybox::new(device, queue, surface_format))
        } else {
            None
        };

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            tracing::error!(%error, "shader validation failed");
            return Err(GpuError::Shader(error.to_string()));
        }

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&FrameUniforms {
                projection: Mat4::IDENTITY.to_cols_array_2d(),
                color: options.flat_color,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniform_buffer"),
            size: draw_stride * CELL_COUNT as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &draw_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        let mesh = Mesh::cube();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_vertices(&mesh)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let cube_texture = GpuTexture::placeholder(device, queue);
        let frame_bind_group =
            texture_bind_group(device, &frame_layout, &frame_buffer, &cube_texture, "frame_bind_group");

        let depth_texture = create_depth_texture(device, width, height);

        tracing::debug!(
            variant = ?options.variant,
            skybox = options.skybox,
            draw_stride,
            "cube grid renderer ready"
        );

        Ok(Self {
            options: *options,
            cube_pipeline,
            frame_layout,
            frame_buffer,
            frame_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_texture,
            skybox,
            depth_texture,
        })
    }

    pub fn cube_texture_size(&self) -> (u32, u32) {
        self.cube_texture.size()
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    /// Swap in any textures that finished loading since the last call.
    ///
    /// Images the device cannot hold are skipped with a warning and the
    /// placeholder stays bound.
    pub fn apply_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &mut SceneTextures,
    ) {
        let limits = device.limits();
        if let Some(image) = textures.cube.as_mut().and_then(TextureLoad::poll) {
            if fits_limits(&image, &limits) {
                self.cube_texture = GpuTexture::from_image(device, queue, &image, "cube_texture");
                self.frame_bind_group = texture_bind_group(
                    device,
                    &self.frame_layout,
                    &self.frame_buffer,
                    &self.cube_texture,
                    "frame_bind_group",
                );
                tracing::info!(width = image.width, height = image.height, "cube texture bound");
            } else {
                tracing::warn!(
                    width = image.width,
                    height = image.height,
                    max = limits.max_texture_dimension_2d,
                    "cube texture exceeds device limits, keeping placeholder"
                );
            }
        }

        let Some(sky) = &mut self.skybox else {
            return;
        };
        if let Some(images) = textures.skybox.as_mut().and_then(CubeMapLoad::poll) {
            if !cube_fits_limits(&images, &limits) {
                tracing::warn!(
                    size = images.size,
                    max = limits.max_texture_dimension_2d,
                    "skybox faces exceed device limits, keeping placeholder"
                );
                return;
            }
            sky.texture = GpuTexture::cube_from_images(device, queue, &images, "skybox_texture");
            sky.bind_group = texture_bind_group(
                device,
                &sky.layout,
                &sky.uniform_buffer,
                &sky.texture,
                "skybox_bind_group",
            );
            tracing::info!(size = images.size, "skybox texture bound");
        }
    }

    /// Render one frame: skybox (if enabled), then one draw per planned cube.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                projection: plan.projection.to_cols_array_2d(),
                color: self.options.flat_color,
            }),
        );

        let count = plan.draws.len().min(CELL_COUNT);
        let stride = self.draw_stride as usize;
        let mut staging = vec![0u8; count * stride];
        for (i, draw) in plan.draws.iter().take(count).enumerate() {
            let uniforms = DrawUniforms {
                model_view: draw.model_view.to_cols_array_2d(),
            };
            let start = i * stride;
            staging[start..start + std::mem::size_of::<DrawUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        if !staging.is_empty() {
            queue.write_buffer(&self.draw_buffer, 0, &staging);
        }

        if let Some(sky) = &self.skybox {
            queue.write_buffer(
                &sky.uniform_buffer,
                0,
                bytemuck::bytes_of(&SkyUniforms {
                    view_proj: sky_view_projection(plan).to_cols_array_2d(),
                }),
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let [r, g, b, a] = self.options.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(sky) = &self.skybox {
                pass.set_pipeline(&sky.pipeline);
                pass.set_bind_group(0, &sky.bind_group, &[]);
                pass.set_vertex_buffer(0, sky.vertex_buffer.slice(..));
                pass.set_index_buffer(sky.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..sky.index_count, 0, 0..1);
            }

            pass.set_pipeline(&self.cube_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
            pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for i in 0..count {
                let offset = (i as u64 * self.draw_stride) as u32;
                pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                pass.draw_indexed(0..plan.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

impl Skybox {
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, surface_format: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox_bind_group_layout"),
            entries: &texture_layout_entries(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                wgpu::TextureViewDimension::Cube,
            ),
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SKYBOX_SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sky"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_sky"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Drawn first at depth 1.0 without writing depth; cubes draw over it.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_uniform_buffer"),
            contents: bytemuck::bytes_of(&SkyUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let mesh = Mesh::skybox();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertex_buffer"),
            contents: bytemuck::cast_slice(mesh.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_index_buffer"),
            contents: bytemuck::cast_slice(mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let texture = GpuTexture::placeholder_cube(device, queue);
        let bind_group =
            texture_bind_group(device, &layout, &uniform_buffer, &texture, "skybox_bind_group");

        Self {
            pipeline,
            layout,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count() as u32,
            texture,
        }
    }
}

/// Uniform buffer at binding 0, texture at 1, sampler at 2.
fn texture_layout_entries(
    visibility: wgpu::ShaderStages,
    view_dimension: wgpu::TextureViewDimension,
) -> [wgpu::BindGroupLayoutEntry; 3] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    texture: &GpuTexture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
