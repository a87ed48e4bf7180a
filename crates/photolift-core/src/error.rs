//! Error types for analysis and enhancement.

use thiserror::Error;

/// Errors surfaced by the analysis and enhancement pipeline.
///
/// Channel arithmetic never produces an error: every transform clamps its
/// output to `[0, 255]`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnhanceError {
    /// The raster's channel layout is neither RGB nor RGBA.
    #[error("Unsupported channel layout: {channels} channels (expected RGB or RGBA)")]
    UnsupportedFormat { channels: u8 },

    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer length doesn't match `width * height * channels`.
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },

    /// A transform stage could not run.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: &'static str, reason: String },

    /// The run was aborted at a stage boundary.
    #[error("Enhancement cancelled before stage '{stage}'")]
    Cancelled { stage: &'static str },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
