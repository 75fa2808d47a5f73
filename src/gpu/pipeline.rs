//! Line pipeline: WGSL source, bind group layout, and pipeline creation.

use super::shader::BootstrapError;

/// Uniform block size in bytes.
///
/// Layout:
///   [0..64]    `relative_matrix`: mat4x4<f32> (camera-relative projection)
///   [64..80]   color:           vec4<f32>   (premultiplied at blend time)
///   [80..88]   `center_high`:     vec2<f32>   (camera center, high parts)
///   [88..96]   `center_low`:      vec2<f32>   (camera center, low parts)
///   [96..100]  `width_units`:     f32         (line width in Mercator units)
///   [100..104] feather:         f32         (AA band in across-units)
///   [104..108] `point_count`:     u32         (confirmed + live)
///   [108..112] _pad
pub const UNIFORM_SIZE: u64 = 112;

/// The built-in line shader. One source text carries both stages; the
/// entry points select the stage.
///
/// The vertex stage pulls positions from the mirror texture instead of a
/// vertex buffer: strip vertex `vi` resolves to a point index and a side
/// sign, the point and its neighbors are loaded as high/low texels, and the
/// segment is widened perpendicular to the averaged neighbor direction.
///
/// Precision contract: world positions are reconstructed as
/// `(high - center_high) + (low - center_low)` — each part is made
/// camera-relative *before* the parts are summed, so the cancellation
/// happens while magnitudes are still small. Do not reorder.
///
/// A lone point has no segment direction: the fallback direction collapses
/// both strip sides onto one axis and the quad has zero area, so a single
/// live point draws nothing until a second point gives the line a
/// direction.
pub const LINE_SHADER_SRC: &str = "
struct Uniforms {
    relative_matrix: mat4x4<f32>,
    color: vec4<f32>,
    center_high: vec2<f32>,
    center_low: vec2<f32>,
    width_units: f32,
    feather: f32,
    point_count: u32,
    _pad: u32,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var position_texture: texture_2d<f32>;

// Camera-relative position of the vertex at `index`.
fn load_point(index: i32) -> vec2<f32> {
    let side = i32(textureDimensions(position_texture).x);
    let texel = textureLoad(position_texture, vec2<i32>(index % side, index / side), 0);
    let high = texel.xy - uniforms.center_high;
    let low = texel.zw - uniforms.center_low;
    return high + low;
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    // Across-width coordinate in [-1, 1]; 0 at the centerline.
    @location(0) across: f32,
}

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VertexOutput {
    let n = i32(uniforms.point_count);
    // 2n + 2 strip vertices; the first and last repeat a vertex so the
    // strip starts and ends degenerate.
    let strip = clamp(i32(vi) - 1, 0, 2 * n - 1);
    let point = strip / 2;
    let side_sign = f32(strip & 1) * 2.0 - 1.0;

    let here = load_point(point);
    let prev = load_point(max(point - 1, 0));
    let next = load_point(min(point + 1, n - 1));

    var dir = next - prev;
    if (length(dir) < 1e-12) {
        dir = vec2<f32>(1.0, 0.0);
    } else {
        dir = normalize(dir);
    }
    let normal = vec2<f32>(-dir.y, dir.x);

    let offset = normal * uniforms.width_units * 0.5 * side_sign;

    var out: VertexOutput;
    out.position = uniforms.relative_matrix * vec4<f32>(here + offset, 0.0, 1.0);
    out.across = side_sign;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    // Edge antialiasing: fade over the feather band at the strip edges.
    let a = 1.0 - smoothstep(1.0 - uniforms.feather, 1.0, abs(input.across));
    // Premultiplied alpha output.
    return vec4<f32>(uniforms.color.rgb * a, a) * uniforms.color.a;
}
";

/// Number of strip vertices the draw call covers for `n` line points:
/// two per point, plus a degenerate duplicate at each end.
pub fn strip_vertex_count(points: usize) -> u32 {
    if points == 0 {
        return 0;
    }
    (2 * points + 2) as u32
}

/// Bind group layout: binding 0 = uniforms, binding 1 = position texture.
/// The texture is RGBA32F and read with `textureLoad`, hence unfilterable.
pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("line_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
        ],
    })
}

/// Line pipeline: widened triangle strip with premultiplied alpha blending.
///
/// Both stages come from `source`; validation failures (bad WGSL, layout
/// mismatch) are captured via an error scope and returned with the full
/// diagnostic text rather than raised through the uncaptured-error handler.
pub fn create_line_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::BindGroupLayout,
    source: &str,
) -> Result<wgpu::RenderPipeline, BootstrapError> {
    // The guard must stay alive until after pipeline creation; dropping it
    // pops the scope early and validation errors escape to the
    // uncaptured-error handler instead.
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("line_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("line_pipeline_layout"),
        bind_group_layouts: &[layout],
        immediate_size: 0,
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("line_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState {
                    // Premultiplied alpha: shader outputs (rgb * a, a)
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    if let Some(e) = pollster::block_on(scope.pop()) {
        return Err(BootstrapError::Validation(e.to_string()));
    }

    Ok(pipeline)
}
