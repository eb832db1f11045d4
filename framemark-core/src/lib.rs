//! framemark Core Library
//!
//! This library provides the data structures shared by every stage of the
//! framemark pipeline: the cyclic label set, the top-right placement geometry
//! and the label style configuration.

pub mod label_set;
pub mod placement;
pub mod style;

pub use label_set::LabelSet;
pub use placement::{BoxRect, Overflow, Placement, TextExtent};
pub use style::LabelStyle;

/// Result type for framemark-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for framemark-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Label set must contain at least one label")]
    EmptyLabelSet,

    #[error("Invalid label style: {0}")]
    InvalidStyle(String),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
