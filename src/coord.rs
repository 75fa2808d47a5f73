//! Normalized Web Mercator coordinates.

use std::f64::consts::PI;

/// Base tile size in pixels; the world is `TILE_SIZE * 2^zoom` pixels wide.
pub const TILE_SIZE: f64 = 512.0;

/// A position in normalized Web Mercator space.
///
/// Both axes range over `[0, 1]` for the whole world: `(0, 0)` is the
/// north-west corner, `(1, 1)` the south-east. Kept in `f64` on the CPU;
/// the GPU side sees the high/low split form (see [`crate::encode`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorCoord {
    pub x: f64,
    pub y: f64,
}

impl MercatorCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Project geographic coordinates (degrees) into normalized Mercator.
    ///
    /// Latitude is clamped to the Web Mercator limit (~±85.05°) where the
    /// projection diverges.
    pub fn from_lng_lat(lng: f64, lat: f64) -> Self {
        const MAX_LAT: f64 = 85.051128779806604;
        let lat = lat.clamp(-MAX_LAT, MAX_LAT);
        let x = (lng + 180.0) / 360.0;
        let y = (1.0 - ((lat.to_radians() / 2.0 + PI / 4.0).tan()).ln() / PI) / 2.0;
        Self { x, y }
    }
}
