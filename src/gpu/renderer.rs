//! The line renderer: owns the pipeline, uniform buffer, bind group, and
//! the position mirror texture; builds an immutable draw descriptor per
//! frame and issues the single draw call.

use crate::camera::CameraFrame;
use crate::config::LayerConfig;
use crate::encode;

use super::pipeline::{self, UNIFORM_SIZE};
use super::shader::{BootstrapError, LINE_SHADER, ShaderProvider};
use super::state::GpuState;
use super::texture::PositionTexture;

/// Per-frame uniform values, computed on the CPU and uploaded as one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub relative_matrix: [f32; 16],
    pub color: [f32; 4],
    pub center_high: [f32; 2],
    pub center_low: [f32; 2],
    pub width_units: f32,
    pub feather: f32,
    pub point_count: u32,
}

impl FrameUniforms {
    /// Derive the frame uniforms from the camera and layer settings.
    ///
    /// The camera center is split into high/low parts with the same encoder
    /// the vertices went through, and the line width is converted from
    /// pixels to Mercator units at the current zoom so thickness stays
    /// screen-constant.
    pub fn for_frame(camera: &CameraFrame, config: &LayerConfig, point_count: usize) -> Self {
        let cx = encode::split(camera.center.x);
        let cy = encode::split(camera.center.y);
        let width_units = (f64::from(config.line_width_px) * camera.units_per_pixel()) as f32;
        // One pixel of edge fade on each side, in across-width units.
        let feather = (2.0 / config.line_width_px.max(1.0)).clamp(0.0, 1.0);
        Self {
            relative_matrix: camera.relative_eye_matrix(),
            color: config.rgba(),
            center_high: [cx.high, cy.high],
            center_low: [cx.low, cy.low],
            width_units,
            feather,
            point_count: point_count as u32,
        }
    }

    /// Serialize to the WGSL uniform block layout (see
    /// [`pipeline::UNIFORM_SIZE`]).
    pub fn to_bytes(&self) -> [u8; UNIFORM_SIZE as usize] {
        let mut bytes = [0u8; UNIFORM_SIZE as usize];
        let mut offset = 0;
        let scalars = [self.width_units, self.feather];
        let floats = self
            .relative_matrix
            .iter()
            .chain(&self.color)
            .chain(&self.center_high)
            .chain(&self.center_low)
            .chain(&scalars);
        for &v in floats {
            bytes[offset..offset + 4].copy_from_slice(&v.to_ne_bytes());
            offset += 4;
        }
        bytes[offset..offset + 4].copy_from_slice(&self.point_count.to_ne_bytes());
        // Remaining 4 bytes stay zero (padding).
        bytes
    }
}

/// Everything one draw call needs, as an immutable value: the pipeline,
/// the bind group carrying the position texture, the uniform values, and
/// the strip extent. No binding state survives between calls.
pub struct DrawDescriptor<'a> {
    pub pipeline: &'a wgpu::RenderPipeline,
    pub bind_group: &'a wgpu::BindGroup,
    pub uniform_buffer: &'a wgpu::Buffer,
    pub uniforms: FrameUniforms,
    pub strip_vertices: u32,
}

/// Upload the frame uniforms and issue the descriptor's draw call.
///
/// A zero-vertex descriptor is a no-op.
pub fn draw(queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>, desc: &DrawDescriptor<'_>) {
    if desc.strip_vertices == 0 {
        return;
    }
    queue.write_buffer(desc.uniform_buffer, 0, &desc.uniforms.to_bytes());
    pass.set_pipeline(desc.pipeline);
    pass.set_bind_group(0, desc.bind_group, &[]);
    pass.draw(0..desc.strip_vertices, 0..1);
}

/// GPU half of the overlay layer, created by a successful bootstrap.
pub struct LineRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: PositionTexture,
}

impl LineRenderer {
    /// Load the line shader through `provider`, build the pipeline, and
    /// allocate the position texture (`side x side` texels).
    ///
    /// Fetch and validation failures are returned, not raised; the caller
    /// logs them and leaves the layer inert.
    pub fn bootstrap(
        gpu: &GpuState,
        provider: &dyn ShaderProvider,
        target_format: wgpu::TextureFormat,
        side: u32,
    ) -> Result<Self, BootstrapError> {
        let device = &gpu.device;
        let source = provider.load(LINE_SHADER)?;

        let layout = pipeline::create_bind_group_layout(device);
        let line_pipeline = pipeline::create_line_pipeline(device, target_format, &layout, &source)?;

        let texture = PositionTexture::new(device, side);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_uniform_buffer"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("line_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
            ],
        });

        Ok(Self {
            pipeline: line_pipeline,
            uniform_buffer,
            bind_group,
            texture,
        })
    }

    pub fn texture(&self) -> &PositionTexture {
        &self.texture
    }

    /// Build the immutable draw descriptor for this frame.
    pub fn frame_descriptor(
        &self,
        camera: &CameraFrame,
        config: &LayerConfig,
        point_count: usize,
    ) -> DrawDescriptor<'_> {
        DrawDescriptor {
            pipeline: &self.pipeline,
            bind_group: &self.bind_group,
            uniform_buffer: &self.uniform_buffer,
            uniforms: FrameUniforms::for_frame(camera, config, point_count),
            strip_vertices: pipeline::strip_vertex_count(point_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MAT4_IDENTITY;
    use crate::coord::MercatorCoord;

    fn camera(x: f64, y: f64, zoom: f64) -> CameraFrame {
        CameraFrame {
            projection: MAT4_IDENTITY,
            center: MercatorCoord::new(x, y),
            zoom,
        }
    }

    #[test]
    fn uniform_bytes_match_block_size() {
        let u = FrameUniforms::for_frame(&camera(0.5, 0.5, 3.0), &LayerConfig::default(), 7);
        assert_eq!(u.to_bytes().len() as u64, UNIFORM_SIZE);
    }

    #[test]
    fn point_count_lands_at_its_offset() {
        let u = FrameUniforms::for_frame(&camera(0.5, 0.5, 3.0), &LayerConfig::default(), 42);
        let bytes = u.to_bytes();
        let count = u32::from_ne_bytes([bytes[104], bytes[105], bytes[106], bytes[107]]);
        assert_eq!(count, 42);
    }

    #[test]
    fn center_split_matches_encoder() {
        let c = camera(0.7234567891234567, 0.4182736451928374, 15.0);
        let u = FrameUniforms::for_frame(&c, &LayerConfig::default(), 1);
        let sx = encode::split(c.center.x);
        let sy = encode::split(c.center.y);
        assert_eq!(u.center_high, [sx.high, sy.high]);
        assert_eq!(u.center_low, [sx.low, sy.low]);
    }

    #[test]
    fn width_tracks_zoom() {
        let cfg = LayerConfig::default(); // 20 px
        let z0 = FrameUniforms::for_frame(&camera(0.5, 0.5, 0.0), &cfg, 1);
        assert!((f64::from(z0.width_units) - 20.0 / 512.0).abs() < 1e-9);

        // One zoom level in: same pixels, half the Mercator units.
        let z1 = FrameUniforms::for_frame(&camera(0.5, 0.5, 1.0), &cfg, 1);
        assert!((f64::from(z1.width_units) - 10.0 / 512.0).abs() < 1e-9);
    }

    #[test]
    fn feather_never_exceeds_half_width() {
        let thin = LayerConfig {
            line_width_px: 0.5,
            ..LayerConfig::default()
        };
        let u = FrameUniforms::for_frame(&camera(0.5, 0.5, 0.0), &thin, 1);
        assert!(u.feather <= 1.0);
    }
}
