//! Layer configuration.

use log::warn;
use serde::{Deserialize, Serialize};

/// Overlay layer configuration, loadable from TOML.
///
/// Every field has a default so partial files work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// On-screen line width in pixels; converted to Mercator units per
    /// frame so the line stays visually constant under zoom.
    pub line_width_px: f32,
    /// Line color ("#RRGGBB" hex).
    pub color: String,
    /// Line opacity, clamped to [0.0, 1.0].
    pub opacity: f32,
    /// Total vertex texel budget. Usable confirmed capacity is two less
    /// (the final texel is reserved for the live point).
    pub capacity: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            line_width_px: 20.0,
            color: "#ff7800".to_owned(),
            opacity: 1.0,
            capacity: 4096,
        }
    }
}

impl LayerConfig {
    /// The configured color as RGBA, falling back to the default on an
    /// unparseable string.
    pub fn rgba(&self) -> [f32; 4] {
        let rgb = parse_hex_color(&self.color).unwrap_or_else(|| {
            warn!("invalid color {:?}, using default", self.color);
            parse_hex_color(&Self::default().color).unwrap_or([1.0, 0.47, 0.0])
        });
        [rgb[0], rgb[1], rgb[2], self.opacity.clamp(0.0, 1.0)]
    }

    /// Returns `capacity`, falling back to the default when below the
    /// two-texel minimum the vertex store needs (one live slot plus the
    /// reserved final texel).
    pub fn effective_capacity(&self) -> usize {
        if self.capacity < 2 {
            warn!("invalid capacity {}, using default", self.capacity);
            return Self::default().capacity;
        }
        self.capacity
    }
}

/// Parse a "#RRGGBB" hex color into RGB floats.
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(hex, 16).ok()?;
    Some([
        ((v >> 16) & 0xFF) as f32 / 255.0,
        ((v >> 8) & 0xFF) as f32 / 255.0,
        (v & 0xFF) as f32 / 255.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = LayerConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: LayerConfig = toml::from_str(&toml_str).expect("deserialize");
        assert!((parsed.line_width_px - 20.0).abs() < f32::EPSILON);
        assert_eq!(parsed.color, "#ff7800");
        assert!((parsed.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(parsed.capacity, 4096);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed: LayerConfig = toml::from_str("line_width_px = 4.0\n").expect("deserialize");
        assert!((parsed.line_width_px - 4.0).abs() < f32::EPSILON);
        assert_eq!(parsed.capacity, 4096);
        assert_eq!(parsed.color, "#ff7800");
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#000000"), Some([0.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("#ffffff"), Some([1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("not-a-color"), None);
        assert_eq!(parse_hex_color("#fff"), None);
    }

    #[test]
    fn invalid_color_falls_back_to_default() {
        let cfg = LayerConfig {
            color: "chartreuse".to_owned(),
            ..LayerConfig::default()
        };
        let rgba = cfg.rgba();
        let default_rgb = parse_hex_color("#ff7800").unwrap();
        assert_eq!(&rgba[..3], &default_rgb[..]);
    }

    #[test]
    fn degenerate_capacity_falls_back_to_default() {
        let parsed: LayerConfig = toml::from_str("capacity = 1\n").expect("deserialize");
        assert_eq!(parsed.capacity, 1);
        assert_eq!(parsed.effective_capacity(), 4096);

        let zero: LayerConfig = toml::from_str("capacity = 0\n").expect("deserialize");
        assert_eq!(zero.effective_capacity(), 4096);

        // The minimum usable value passes through untouched.
        let min = LayerConfig {
            capacity: 2,
            ..LayerConfig::default()
        };
        assert_eq!(min.effective_capacity(), 2);
    }

    #[test]
    fn opacity_is_clamped() {
        let cfg = LayerConfig {
            opacity: 3.0,
            ..LayerConfig::default()
        };
        assert!((cfg.rgba()[3] - 1.0).abs() < f32::EPSILON);
    }
}
