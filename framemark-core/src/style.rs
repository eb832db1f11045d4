//! Label style configuration

use crate::{Error, Overflow, Result};

/// Fixed label size used when no style overrides it
pub const DEFAULT_FONT_SIZE: f32 = 40.0;

/// Largest accepted margin, padding or outline width, in pixels
pub const MAX_SPACING: u32 = u16::MAX as u32;

/// Visual parameters of the label and its backing box
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LabelStyle {
    /// Font size in pixels (outline fonts only; the builtin font has one size)
    pub font_size: f32,
    /// Distance between the label and the top/right frame edges
    pub margin: u32,
    /// Space between the label ink and the backing box edge
    pub padding: u32,
    /// Backing box fill, RGBA
    pub box_fill: [u8; 4],
    /// Backing box outline, RGBA
    pub box_outline: [u8; 4],
    /// Outline thickness in pixels
    pub outline_width: u32,
    /// Label text color, RGBA
    pub text_color: [u8; 4],
    /// Opaque color transparency is flattened against before palette reduction
    pub background: [u8; 3],
    /// Placement policy for labels wider than the frame
    pub overflow: Overflow,
    /// GIF quantizer speed, 1 (best) to 30 (fastest)
    pub quantizer_speed: i32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            margin: 10,
            padding: 5,
            box_fill: [255, 255, 255, 200],
            box_outline: [0, 0, 0, 255],
            outline_width: 1,
            text_color: [0, 0, 0, 255],
            background: [255, 255, 255],
            overflow: Overflow::Clamp,
            quantizer_speed: 10,
        }
    }
}

impl LabelStyle {
    /// Checks the values the renderer and quantizer cannot handle
    pub fn validate(&self) -> Result<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(Error::InvalidStyle(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        for (name, value) in [
            ("margin", self.margin),
            ("padding", self.padding),
            ("outline_width", self.outline_width),
        ] {
            if value > MAX_SPACING {
                return Err(Error::InvalidStyle(format!(
                    "{name} must be at most {MAX_SPACING}, got {value}"
                )));
            }
        }
        if !(1..=30).contains(&self.quantizer_speed) {
            return Err(Error::InvalidStyle(format!(
                "quantizer_speed must be in 1..=30, got {}",
                self.quantizer_speed
            )));
        }
        Ok(())
    }

    /// Parses a style from JSON; missing fields keep their defaults
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let style: Self = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }
}
