//! Double-single float encoding.
//!
//! A single `f32` carries ~7 significant decimal digits — not enough for a
//! normalized Mercator coordinate, where centimeter accuracy at street zoom
//! needs ~10. Splitting the `f64` into a high part (the nearest `f32`) and a
//! low part (the residual, also `f32`) keeps the full precision across the
//! CPU/GPU boundary. The shader never adds the two parts directly; it
//! subtracts the camera center from each part first, so the sum happens at
//! small magnitude where `f32` has bits to spare.

/// One coordinate axis split into a high/low `f32` pair.
///
/// Invariant: `high` is the nearest `f32` to the source value and
/// `f64::from(high) + f64::from(low)` reconstructs it to well beyond
/// single precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitFloat {
    pub high: f32,
    pub low: f32,
}

/// Split a double-precision value into a high/low single-precision pair.
///
/// Pure value transform: deterministic, no error cases.
pub fn split(value: f64) -> SplitFloat {
    let high = value as f32;
    let low = (value - f64::from(high)) as f32;
    SplitFloat { high, low }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Residual reconstruction error of the high/low pair, in `f64`.
    fn round_trip_error(v: f64) -> f64 {
        let s = split(v);
        (f64::from(s.high) + f64::from(s.low) - v).abs()
    }

    #[test]
    fn round_trip_beats_single_precision() {
        // Mercator coordinates with more significant digits than f32 holds.
        let values = [
            1.0 / 3.0,
            0.7234567891234567,
            0.0001234567890123,
            0.9999999876543210,
            -0.3333333333333333,
        ];
        for &v in &values {
            let single_error = (f64::from(v as f32) - v).abs();
            let split_error = round_trip_error(v);
            assert!(split_error < 1e-12, "split error {split_error} for {v}");
            assert!(
                split_error < single_error,
                "split ({split_error}) should beat single precision ({single_error}) for {v}"
            );
        }
    }

    #[test]
    fn single_precision_alone_is_insufficient() {
        // The motivating case: f32 rounding alone loses more than 1e-9 of a
        // normalized Mercator coordinate (meters at street zoom).
        let v = 1.0 / 3.0;
        assert!((f64::from(v as f32) - v).abs() > 1e-9);
    }

    #[test]
    fn high_is_nearest_f32() {
        let v = 0.123456789012345;
        let s = split(v);
        assert_eq!(s.high, v as f32);
    }

    #[test]
    fn exact_values_have_zero_low() {
        for v in [0.0, 0.5, 1.0, -2.0, 0.25] {
            let s = split(v);
            assert_eq!(s.low, 0.0);
            assert_eq!(f64::from(s.high), v);
        }
    }
}
