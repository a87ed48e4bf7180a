//! Decoding of any supported container into a raster.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageReader};
use tracing::debug;

use super::DecodeError;
use crate::raster::RasterImage;

/// Lowercase file extensions accepted as input.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// True if `path` has one of [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Decode image bytes, sniffing the format from the content.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is unknown or the data
/// is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Io(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat(
            "could not determine image format".to_string(),
        ));
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::InvalidFormat(e.to_string()))?;
    Ok(into_raster(img))
}

/// Read and decode a file.
pub fn open(path: impl AsRef<Path>) -> Result<RasterImage, DecodeError> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).map_err(|e| DecodeError::Io(format!("{}: {}", path.display(), e)))?;
    let raster = decode_image(&bytes)?;
    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        channels = raster.channels(),
        "Decoded image"
    );
    Ok(raster)
}

fn into_raster(img: DynamicImage) -> RasterImage {
    if img.color().has_alpha() {
        RasterImage::from_rgba_image(img.into_rgba8())
    } else {
        RasterImage::from_rgb_image(img.into_rgb8())
    }
}
