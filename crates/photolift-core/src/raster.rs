//! In-memory raster type shared by every pipeline stage.

use serde::{Deserialize, Serialize};

use crate::error::EnhanceError;

/// Channel layouts the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    /// 3 bytes per pixel.
    Rgb,
    /// 4 bytes per pixel, alpha last. Alpha is never modified by a stage.
    Rgba,
}

impl ChannelLayout {
    /// Bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    fn from_channels(channels: u8) -> Result<Self, EnhanceError> {
        match channels {
            3 => Ok(ChannelLayout::Rgb),
            4 => Ok(ChannelLayout::Rgba),
            _ => Err(EnhanceError::UnsupportedFormat { channels }),
        }
    }
}

/// An 8-bit interleaved raster in row-major order.
///
/// The buffer length always equals `width * height * channels`. The channel
/// count itself is not restricted here so that a collaborator can hand over
/// whatever it decoded; [`RasterImage::layout`] and [`RasterImage::validate`]
/// reject anything the pipeline cannot process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Create a raster, checking the buffer length against the dimensions.
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self, EnhanceError> {
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if pixels.len() != expected {
            return Err(EnhanceError::BufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Create an RGB raster.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, EnhanceError> {
        Self::new(width, height, 3, pixels)
    }

    /// Create an RGBA raster.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, EnhanceError> {
        Self::new(width, height, 4, pixels)
    }

    /// Create a raster filled with a single RGB color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            channels: 3,
            pixels,
        }
    }

    /// Create a raster from an `image::RgbImage`.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: 3,
            pixels: img.into_raw(),
        }
    }

    /// Create a raster from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: 4,
            pixels: img.into_raw(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Raw interleaved pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access for in-place kernels. The length cannot change.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the raster and return its buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Bytes in one row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        (self.width as usize) * (self.channels as usize)
    }

    /// Channel layout, or `UnsupportedFormat` for anything but RGB/RGBA.
    pub fn layout(&self) -> Result<ChannelLayout, EnhanceError> {
        ChannelLayout::from_channels(self.channels)
    }

    /// Check that the raster can enter the pipeline.
    ///
    /// Layout is checked before dimensions so that a grayscale buffer is
    /// reported as such even when it is empty.
    pub fn validate(&self) -> Result<ChannelLayout, EnhanceError> {
        let layout = self.layout()?;
        if self.width == 0 || self.height == 0 {
            return Err(EnhanceError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(layout)
    }

    /// Drop the alpha channel if present.
    pub fn to_rgb(&self) -> Result<RasterImage, EnhanceError> {
        match self.layout()? {
            ChannelLayout::Rgb => Ok(self.clone()),
            ChannelLayout::Rgba => {
                let mut pixels = Vec::with_capacity(self.pixel_count() * 3);
                for chunk in self.pixels.chunks_exact(4) {
                    pixels.extend_from_slice(&chunk[..3]);
                }
                Ok(Self {
                    width: self.width,
                    height: self.height,
                    channels: 3,
                    pixels,
                })
            }
        }
    }
}
