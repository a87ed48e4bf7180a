//! Unsharp mask.
//!
//! `sharp = image + (percent / 100) * (image - gaussian_blur(image, radius))`,
//! applied per channel only where the residual reaches `threshold`.

use image::RgbImage;
use imageproc::filter::gaussian_blur_f32;

use crate::config::SharpenParams;
use crate::error::EnhanceError;
use crate::parallel::for_each_row_mut;
use crate::raster::RasterImage;

const STAGE: &str = "sharpen";

/// Blur the RGB channels of `raster` with the given sigma.
fn blurred_rgb(raster: &RasterImage, radius: f32) -> Result<RgbImage, EnhanceError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(EnhanceError::StageFailed {
            stage: STAGE,
            reason: format!("blur radius must be positive, got {radius}"),
        });
    }
    let rgb = raster.to_rgb()?;
    let (width, height) = (rgb.width(), rgb.height());
    let img = RgbImage::from_raw(width, height, rgb.into_pixels()).ok_or_else(|| {
        EnhanceError::StageFailed {
            stage: STAGE,
            reason: "pixel buffer does not match dimensions".to_string(),
        }
    })?;
    Ok(gaussian_blur_f32(&img, radius))
}

/// Sharpen `raster` in place. Alpha is untouched.
pub fn apply_unsharp_mask(raster: &mut RasterImage, params: &SharpenParams) -> Result<(), EnhanceError> {
    let blurred = blurred_rgb(raster, params.radius)?;
    let blurred = blurred.as_raw();

    let channels = raster.channels() as usize;
    let width = raster.width() as usize;
    let stride = raster.row_stride();
    let pixel_count = raster.pixel_count();
    let amount = params.percent / 100.0;
    let threshold = i16::from(params.threshold);

    for_each_row_mut(raster.pixels_mut(), stride, pixel_count, |y, row| {
        let blur_row = &blurred[y * width * 3..(y + 1) * width * 3];
        for (px, bl) in row.chunks_exact_mut(channels).zip(blur_row.chunks_exact(3)) {
            for (v, &b) in px[..3].iter_mut().zip(bl) {
                let diff = *v as i16 - b as i16;
                if diff.abs() >= threshold {
                    *v = (*v as f32 + diff as f32 * amount).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    });
    Ok(())
}
