//! framemark Codec Library
//!
//! This library reads the frames of animated images and writes labeled
//! frames back out as an animated GIF.

pub mod frame_reader;
pub mod gif_encoder;

pub use frame_reader::{FrameReader, SourceFrame, DEFAULT_FRAME_DURATION_MS};
pub use gif_encoder::{save_animation, write_animation, GifSequenceEncoder};

/// Result type for framemark-codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for framemark-codec operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encode error: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("No frames extracted")]
    NoFrames,

    #[error("Got {frames} frames but {durations} durations")]
    LengthMismatch { frames: usize, durations: usize },

    #[error("Frame {index} is {found:?}, expected {expected:?}")]
    FrameSizeMismatch {
        index: usize,
        expected: (u16, u16),
        found: (u16, u16),
    },
}
