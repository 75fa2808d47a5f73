//! The overlay layer: editing API, attach hook, and per-frame render hook.
//!
//! Lifecycle mirrors a custom map layer: construct the layer, attach it
//! once a GPU device and render target format are known, then let the host
//! call [`LineLayer::render`] every frame. Editing calls may arrive before
//! attach completes — they mutate the CPU store, and the mirror texture
//! catches up with one bulk upload when bootstrap finishes.
//!
//! Single-threaded cooperative model: editing and rendering run on the same
//! thread, so no locking is needed or provided.

use log::error;

use crate::camera::CameraFrame;
use crate::config::LayerConfig;
use crate::coord::MercatorCoord;
use crate::gpu::renderer::{self, LineRenderer};
use crate::gpu::shader::{BootstrapError, ShaderProvider};
use crate::gpu::state::GpuState;
use crate::store::VertexStore;

/// The host map engine boundary. The layer calls this after every mutating
/// edit; coalescing repeated requests is the host's concern.
pub trait MapHost {
    fn request_redraw(&self);
}

/// GPU-side resources, present only after a successful bootstrap.
struct LayerGpu {
    queue: wgpu::Queue,
    renderer: LineRenderer,
}

/// An interactively editable polyline overlay.
pub struct LineLayer {
    config: LayerConfig,
    store: VertexStore,
    gpu: Option<LayerGpu>,
}

impl LineLayer {
    /// Create a detached layer. Editing works immediately; rendering starts
    /// after [`Self::attach`] succeeds.
    ///
    /// An unusable configured capacity falls back to the default (see
    /// [`LayerConfig::effective_capacity`]) rather than failing.
    pub fn new(config: LayerConfig) -> Self {
        let store = VertexStore::new(config.effective_capacity());
        Self {
            config,
            store,
            gpu: None,
        }
    }

    /// Bootstrap the GPU side: fetch and compile the line shader, allocate
    /// the position texture, and sync it with the CPU store.
    ///
    /// On failure the error is logged and returned, and the layer stays
    /// inert — render calls remain no-ops until a later attach succeeds.
    pub fn attach(
        &mut self,
        gpu: &GpuState,
        shaders: &dyn ShaderProvider,
        target_format: wgpu::TextureFormat,
    ) -> Result<(), BootstrapError> {
        let renderer =
            match LineRenderer::bootstrap(gpu, shaders, target_format, self.store.side()) {
                Ok(r) => r,
                Err(e) => {
                    error!("line layer bootstrap failed: {e}");
                    return Err(e);
                },
            };

        // Edits made before attach completed become visible here.
        renderer.texture().upload_all(&gpu.queue, self.store.raw());

        self.gpu = Some(LayerGpu {
            queue: gpu.queue.clone(),
            renderer,
        });
        Ok(())
    }

    /// Whether bootstrap has completed and frames will actually draw.
    pub fn is_renderable(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn store(&self) -> &VertexStore {
        &self.store
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Begin or move the live point, e.g. once per pointer-move event.
    pub fn update_live_point(&mut self, position: MercatorCoord, host: &dyn MapHost) {
        let index = self.store.update_live_point(position);
        if let Some(gpu) = &self.gpu {
            gpu.renderer.texture().write_texel(
                &gpu.queue,
                self.store.texel_of(index),
                self.store.texel(index),
            );
        }
        host.request_redraw();
    }

    /// Commit the live point as a permanent vertex (e.g. on click).
    ///
    /// Silently rejected at the capacity boundary; see
    /// [`VertexStore::confirm_point`].
    pub fn confirm_point(&mut self, host: &dyn MapHost) {
        if self.store.confirm_point() {
            host.request_redraw();
        }
    }

    /// Remove every vertex and zero the mirror texture.
    pub fn clear(&mut self, host: &dyn MapHost) {
        self.store.clear();
        if let Some(gpu) = &self.gpu {
            gpu.renderer.texture().clear(&gpu.queue);
        }
        host.request_redraw();
    }

    /// Per-frame render hook. A no-op until bootstrap completes or while
    /// the polyline is empty.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, camera: &CameraFrame) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let desc =
            gpu.renderer
                .frame_descriptor(camera, &self.config, self.store.point_count());
        renderer::draw(&gpu.queue, pass, &desc);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Counts redraw requests; stands in for the host map engine.
    #[derive(Default)]
    struct RecordingHost {
        redraws: Cell<u32>,
    }

    impl MapHost for RecordingHost {
        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }
    }

    fn small_layer() -> LineLayer {
        LineLayer::new(LayerConfig {
            capacity: 8,
            ..LayerConfig::default()
        })
    }

    #[test]
    fn detached_layer_accepts_edits() {
        let mut layer = small_layer();
        let host = RecordingHost::default();
        assert!(!layer.is_renderable());

        layer.update_live_point(MercatorCoord::new(0.1, 0.2), &host);
        layer.confirm_point(&host);
        assert_eq!(layer.store().confirmed_count(), 1);
        assert_eq!(host.redraws.get(), 2);
    }

    #[test]
    fn degenerate_capacity_does_not_panic() {
        let layer = LineLayer::new(LayerConfig {
            capacity: 1,
            ..LayerConfig::default()
        });
        assert_eq!(layer.store().capacity(), 4096);
    }

    #[test]
    fn every_live_update_requests_a_redraw() {
        let mut layer = small_layer();
        let host = RecordingHost::default();
        for i in 0..5 {
            layer.update_live_point(MercatorCoord::new(0.1 * f64::from(i), 0.5), &host);
        }
        assert_eq!(host.redraws.get(), 5);
        // Still one pending point, no confirmed vertices.
        assert_eq!(layer.store().confirmed_count(), 0);
        assert!(layer.store().is_pending());
    }

    #[test]
    fn rejected_confirm_requests_no_redraw() {
        let mut layer = LineLayer::new(LayerConfig {
            capacity: 4,
            ..LayerConfig::default()
        });
        let host = RecordingHost::default();

        layer.update_live_point(MercatorCoord::new(0.1, 0.1), &host);
        layer.confirm_point(&host);
        layer.update_live_point(MercatorCoord::new(0.2, 0.2), &host);
        layer.confirm_point(&host);
        layer.update_live_point(MercatorCoord::new(0.3, 0.3), &host);
        let before = host.redraws.get();

        // Boundary: nothing mutates, nothing to repaint.
        layer.confirm_point(&host);
        assert_eq!(host.redraws.get(), before);
        assert_eq!(layer.store().confirmed_count(), 2);
    }

    #[test]
    fn confirm_without_pending_requests_no_redraw() {
        let mut layer = small_layer();
        let host = RecordingHost::default();
        layer.confirm_point(&host);
        assert_eq!(host.redraws.get(), 0);
    }

    #[test]
    fn clear_always_requests_a_redraw() {
        let mut layer = small_layer();
        let host = RecordingHost::default();
        layer.clear(&host);
        assert_eq!(host.redraws.get(), 1);
        assert_eq!(layer.store().point_count(), 0);
    }
}
