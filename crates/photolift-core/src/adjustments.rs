//! Point adjustments: exposure, contrast and saturation.
//!
//! Each kernel works in place on the RGB channels of an interleaved buffer and
//! leaves alpha untouched. Results are rounded to nearest and clamped, so
//! nothing wraps.

use crate::luminance::luma;
use crate::parallel::for_each_row_mut;
use crate::raster::RasterImage;

#[inline]
fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Run `f` over every pixel's RGB triple.
fn map_rgb<F>(raster: &mut RasterImage, f: F)
where
    F: Fn(&mut [u8]) + Sync,
{
    let channels = raster.channels() as usize;
    let stride = raster.row_stride();
    let pixel_count = raster.pixel_count();
    for_each_row_mut(raster.pixels_mut(), stride, pixel_count, |_, row| {
        for px in row.chunks_exact_mut(channels) {
            f(&mut px[..3]);
        }
    });
}

/// Multiply every channel by `factor`.
///
/// Formula: `output = round(input * factor)`
pub fn apply_exposure(raster: &mut RasterImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    map_rgb(raster, |px| {
        for v in px.iter_mut() {
            *v = to_u8(*v as f32 * factor);
        }
    });
}

/// Linear stretch around mid-gray.
///
/// Formula: `output = 128 + (input - 128) * factor`
pub fn apply_contrast(raster: &mut RasterImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    map_rgb(raster, |px| {
        for v in px.iter_mut() {
            *v = to_u8(128.0 + (*v as f32 - 128.0) * factor);
        }
    });
}

/// Scale each pixel's distance from its own luma.
///
/// Formula: `output = luma + (input - luma) * factor`
pub fn apply_saturation(raster: &mut RasterImage, factor: f32) {
    if factor == 1.0 {
        return;
    }
    map_rgb(raster, |px| {
        let l = luma(px[0], px[1], px[2]);
        for v in px.iter_mut() {
            *v = to_u8(l + (*v as f32 - l) * factor);
        }
    });
}
