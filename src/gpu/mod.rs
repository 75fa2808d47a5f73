//! GPU rendering: wgpu state, position texture, pipeline, and line renderer.

pub mod pipeline;
pub mod renderer;
pub mod shader;
pub mod state;
pub mod texture;

pub use renderer::{DrawDescriptor, LineRenderer};
pub use shader::{BootstrapError, BuiltinShaders, FileShaderProvider, ShaderProvider};
pub use state::GpuState;
pub use texture::PositionTexture;
