//! Color type used by widget appearance settings.
//!
//! Saved loadouts store colors the way the front end edits them: red, green
//! and blue as 0-255 channel values and alpha as a 0.0-1.0 opacity.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// RGBA color with 8-bit style channels and a unit alpha
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RgbaColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl RgbaColor {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and an 8-bit alpha (0-255 mapped onto 0.0-1.0)
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64 / 255.0,
        }
    }

    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        (
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
            (self.a * 255.0).round().clamp(0.0, 255.0) as u8,
        )
    }

    /// Check channel bounds. `field` names the offending setting in the error.
    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        for (channel, value) in [("r", self.r), ("g", self.g), ("b", self.b)] {
            if !(0.0..=255.0).contains(&value) {
                return Err(ConfigError::ColorChannel {
                    field,
                    channel,
                    value,
                });
            }
        }
        if !(0.0..=1.0).contains(&self.a) {
            return Err(ConfigError::ColorChannel {
                field,
                channel: "a",
                value: self.a,
            });
        }
        Ok(())
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba8_maps_alpha_to_unit_range() {
        let color = RgbaColor::from_rgba8(47, 120, 190, 40);
        assert_eq!(color.r, 47.0);
        assert_eq!(color.b, 190.0);
        assert!((color.a - 40.0 / 255.0).abs() < 1e-12);
        assert_eq!(color.to_rgba8(), (47, 120, 190, 40));
    }

    #[test]
    fn test_validate_rejects_out_of_range_channels() {
        assert!(RgbaColor::new(255.0, 0.0, 0.0, 1.0).validate("grid").is_ok());

        let err = RgbaColor::new(256.0, 0.0, 0.0, 1.0)
            .validate("grid")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ColorChannel { channel: "r", .. }));

        let err = RgbaColor::new(0.0, 0.0, 0.0, 1.5)
            .validate("text")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ColorChannel {
                field: "text",
                channel: "a",
                ..
            }
        ));
    }

    #[test]
    fn test_color_serialization() {
        let json = serde_json::to_string(&RgbaColor::new(242.0, 242.0, 242.0, 1.0)).unwrap();
        assert_eq!(json, r#"{"r":242.0,"g":242.0,"b":242.0,"a":1.0}"#);

        let color: RgbaColor = serde_json::from_str(r#"{"r":0,"g":0,"b":0,"a":0}"#).unwrap();
        assert_eq!(color, RgbaColor::TRANSPARENT);
    }
}
