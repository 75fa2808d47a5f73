//! GPU-accelerated polyline overlay for interactive maps.
//!
//! Draws thick antialiased line strips whose vertices can be appended and
//! edited in real time (e.g. during a drawing or measuring interaction).
//! Positions are stored as double-single (high/low) float pairs and
//! reconstructed on the GPU relative to the camera center, so world-scale
//! Mercator coordinates survive the single-precision shader pipeline.

pub mod camera;
pub mod config;
pub mod coord;
pub mod encode;
pub mod gpu;
pub mod layer;
pub mod store;

pub use camera::CameraFrame;
pub use config::LayerConfig;
pub use coord::MercatorCoord;
pub use layer::{LineLayer, MapHost};
pub use store::VertexStore;
