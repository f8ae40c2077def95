//! Imaging error types

use std::path::PathBuf;

use thiserror::Error;

/// Imaging errors
#[derive(Error, Debug)]
pub enum ImageError {
    /// Hue outside 0..=359
    #[error("Hue {0} is out of range (0-359)")]
    HueOutOfRange(u16),

    /// An animated sprite needs at least one frame
    #[error("Animation has no frames")]
    EmptyAnimation,

    /// Frame rates must be non-empty and non-zero
    #[error("Invalid frame data: {0}")]
    InvalidFrameData(String),

    /// Failed to read or decode an image file
    #[error("Failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result type for imaging operations
pub type Result<T> = std::result::Result<T, ImageError>;
