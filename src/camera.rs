//! Per-frame camera state and the relative-eye transform.
//!
//! The host map engine supplies a projection matrix, the camera center, and
//! the zoom level each frame. Nothing here is persisted.

use crate::coord::{MercatorCoord, TILE_SIZE};

/// Column-major 4x4 matrix, the layout WGSL `mat4x4<f32>` expects.
pub type Mat4 = [f32; 16];

/// Identity matrix, mostly useful in tests and as a safe default.
pub const MAT4_IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Camera state for one frame, as handed over by the host map engine.
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame {
    /// World-to-clip projection matrix over Mercator coordinates.
    pub projection: Mat4,
    /// Camera center in normalized Mercator space.
    pub center: MercatorCoord,
    /// Map zoom level (world is `TILE_SIZE * 2^zoom` pixels wide).
    pub zoom: f64,
}

impl CameraFrame {
    /// The relative-eye matrix: the projection translated so its origin sits
    /// at the camera center instead of the Mercator origin.
    ///
    /// Shader inputs then stay near zero, which is what lets the f32
    /// pipeline keep sub-pixel precision at planetary coordinate magnitudes.
    /// The translation is accumulated in f64 before narrowing.
    pub fn relative_eye_matrix(&self) -> Mat4 {
        translate(&self.projection, self.center.x, self.center.y, 0.0)
    }

    /// Mercator units covered by one screen pixel at the current zoom.
    pub fn units_per_pixel(&self) -> f64 {
        1.0 / (TILE_SIZE * self.zoom.exp2())
    }
}

/// Post-multiply `m` by a translation of `(x, y, z)` (column-major).
fn translate(m: &Mat4, x: f64, y: f64, z: f64) -> Mat4 {
    let mut out = *m;
    for row in 0..4 {
        let v = f64::from(m[row]) * x
            + f64::from(m[4 + row]) * y
            + f64::from(m[8 + row]) * z
            + f64::from(m[12 + row]);
        out[12 + row] = v as f32;
    }
    out
}
