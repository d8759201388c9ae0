/// WGSL shader for the grid cubes. One draw per cube; the model-view matrix
/// arrives through a dynamic-offset uniform.
pub const CUBE_SHADER: &str = r#"
struct Frame {
    projection: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
@group(0) @binding(1)
var cube_texture: texture_2d<f32>;
@group(0) @binding(2)
var cube_sampler: sampler;

struct Draw {
    model_view: mat4x4<f32>,
};

@group(1) @binding(0)
var<uniform> draw: Draw;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coord: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.projection * draw.model_view * vec4<f32>(vertex.position, 1.0);
    out.tex_coord = vertex.tex_coord;
    return out;
}

@fragment
fn fs_textured(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(cube_texture, cube_sampler, in.tex_coord);
}

@fragment
fn fs_flat(in: VertexOutput) -> @location(0) vec4<f32> {
    return frame.color;
}
"#;

/// WGSL shader for the environment cube-map, drawn at the far plane.
pub const SKYBOX_SHADER: &str = r#"
struct Sky {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: Sky;
@group(0) @binding(1)
var sky_texture: texture_cube<f32>;
@group(0) @binding(2)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> SkyOutput {
    var out: SkyOutput;
    let clip = sky.view_proj * vec4<f32>(position, 1.0);
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_texture, sky_sampler, in.direction);
}
"#;
