//! Crate-wide error type.
//!
//! Almost every failure in the games is recoverable: callers log it and fall
//! back to a placeholder sprite, silence, or default save values.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// No file exists for an asset under any of the accepted extensions.
    #[error("asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// A glyph sheet or glyph-art file exists but cannot be parsed.
    #[error("malformed asset {}: {reason}", path.display())]
    MalformedAsset { path: PathBuf, reason: String },

    #[error("audio unavailable: {0}")]
    Audio(String),

    /// Volumes are floats in 0.0..=1.0 or integer percentages in 0..=100.
    #[error("invalid volume value: {0}")]
    InvalidVolume(String),
}
