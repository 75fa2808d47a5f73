//! GPU device, adapter, and queue management.
//!
//! `GpuState` owns the wgpu device lifetime. The layer itself never creates
//! a surface — presentation belongs to the host map engine — so the device
//! is initialized headless.

use log::{error, info};

/// Device features the layer actually needs, requested one by one when the
/// adapter supports them. The position texture is read with unfiltered
/// `textureLoad`, so no optional features are required today; the list
/// exists so a future need is an explicit entry here, never a blanket
/// enable of everything the adapter offers.
const OPTIONAL_FEATURES: &[wgpu::Features] = &[];

/// GPU state shared by every overlay layer on the same device.
pub struct GpuState {
    pub instance: wgpu::Instance,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuState {
    /// Initialize GPU: create instance, pick an adapter, request a device.
    ///
    /// Prefers a discrete GPU, falling back to any available adapter.
    /// Returns `None` (logged) when no usable device exists; callers treat
    /// that as "the layer stays inert", not as a fatal condition.
    pub fn new() -> Option<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let mut adapter: Option<wgpu::Adapter> = None;
        let mut fallback: Option<wgpu::Adapter> = None;
        for a in pollster::block_on(instance.enumerate_adapters(wgpu::Backends::all())) {
            if a.get_info().device_type == wgpu::DeviceType::DiscreteGpu {
                adapter = Some(a);
                break;
            }
            if fallback.is_none() {
                fallback = Some(a);
            }
        }
        let adapter = match adapter.or(fallback) {
            Some(a) => a,
            None => {
                error!("no GPU adapter available");
                return None;
            },
        };

        let mut features = wgpu::Features::empty();
        for &f in OPTIONAL_FEATURES {
            if adapter.features().contains(f) {
                features |= f;
            }
        }

        let (device, queue) = match pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("geoline"),
                required_features: features,
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        )) {
            Ok(pair) => pair,
            Err(e) => {
                error!("GPU device request failed: {e}");
                return None;
            },
        };

        let adapter_info = adapter.get_info();
        info!(
            "GPU init: adapter={}, backend={:?}, features={features:?}",
            adapter_info.name, adapter_info.backend,
        );

        Some(Self {
            instance,
            device,
            queue,
        })
    }
}
