//! The position mirror texture.
//!
//! A square RGBA32F texture holding one vertex per texel, kept in sync with
//! the CPU-side [`crate::store::VertexStore`]. Single-vertex edits upload a
//! 1x1 region; `clear` and the post-bootstrap sync upload the full extent.

use crate::store::FLOATS_PER_VERTEX;

/// Bytes per RGBA32F texel.
const BYTES_PER_TEXEL: u32 = (FLOATS_PER_VERTEX * 4) as u32;

pub struct PositionTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    side: u32,
}

impl PositionTexture {
    /// Allocate a `side x side` RGBA32F texture, zero-initialized by wgpu.
    pub fn new(device: &wgpu::Device, side: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("position_texture"),
            size: wgpu::Extent3d {
                width: side,
                height: side,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            side,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Upload one vertex texel at its linear index.
    pub fn write_texel(
        &self,
        queue: &wgpu::Queue,
        texel: (u32, u32),
        values: [f32; FLOATS_PER_VERTEX],
    ) {
        let mut bytes = [0u8; BYTES_PER_TEXEL as usize];
        for (i, &v) in values.iter().enumerate() {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&v.to_ne_bytes());
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: texel.0,
                    y: texel.1,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(BYTES_PER_TEXEL),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Upload the full texture extent from the CPU array.
    ///
    /// `data` must hold exactly `side * side * 4` floats.
    pub fn upload_all(&self, queue: &wgpu::Queue, data: &[f32]) {
        debug_assert_eq!(
            data.len(),
            (self.side * self.side) as usize * FLOATS_PER_VERTEX
        );
        let mut bytes = Vec::with_capacity(data.len() * 4);
        for &v in data {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.side * BYTES_PER_TEXEL),
                rows_per_image: Some(self.side),
            },
            wgpu::Extent3d {
                width: self.side,
                height: self.side,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Zero the full texture in one bulk upload.
    pub fn clear(&self, queue: &wgpu::Queue) {
        let zeroes = vec![0.0f32; (self.side * self.side) as usize * FLOATS_PER_VERTEX];
        self.upload_all(queue, &zeroes);
    }
}
