//! framemark Render Library
//!
//! This library draws labels onto frames and reduces the composited frames to
//! palette-indexed images for GIF output.

pub mod bitmap_font;
pub mod font;
pub mod frame_compositor;
pub mod palette;

pub use font::{FontSource, LabelFont, ShapedLabel};
pub use frame_compositor::FrameCompositor;
pub use palette::PaletteFrame;

/// Result type for framemark-render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for framemark-render operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text layout error: {0}")]
    Svg(#[from] usvg::Error),

    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    #[error("No font source could be loaded")]
    NoFont,

    #[error("Failed to allocate a {width}x{height} text canvas")]
    Canvas { width: u32, height: u32 },

    #[error("Frame too large for GIF: {width}x{height}")]
    FrameTooLarge { width: u32, height: u32 },

    #[error("Invalid quantizer speed: {0} (expected 1-30)")]
    InvalidSpeed(i32),
}
