//! Error type for image decoding.

use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The bytes are not an image the decoder recognizes, or are corrupt.
    #[error("Invalid or unsupported image format: {0}")]
    InvalidFormat(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    Io(String),
}
