//! PNG encoding for enhanced output.

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::raster::RasterImage;

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Only RGB and RGBA rasters can be written
    #[error("Unsupported channel count for PNG output: {0}")]
    UnsupportedChannels(u8),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a raster as PNG bytes.
///
/// # Errors
///
/// Fails on empty rasters, on channel counts other than 3 or 4, and if the
/// encoder itself reports an error.
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (raster.width(), raster.height());
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let color = match raster.channels() {
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        n => return Err(EncodeError::UnsupportedChannels(n)),
    };

    let expected = raster.pixel_count() * raster.channels() as usize;
    if raster.pixels().len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: raster.pixels().len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    let encoder = PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(raster.pixels(), width, height, color)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Output file name for an input path: `<stem>_enhanced.png`.
pub fn enhanced_file_name(input: impl AsRef<Path>) -> String {
    let stem = input
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}_enhanced.png")
}
