//! Radial vignette.
//!
//! A mask value in `[floor, 255]` is computed per pixel from its distance to
//! the image centre, and each RGB channel is scaled by `mask / 255`. This is
//! the same as compositing the image over black through the mask.

use crate::config::VignetteParams;
use crate::parallel::for_each_row_mut;
use crate::raster::RasterImage;

/// Radial darkening mask centred on `(width / 2, height / 2)`, integer halves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteMask {
    cx: f64,
    cy: f64,
    max_radius: f64,
    params: VignetteParams,
}

impl VignetteMask {
    pub fn new(width: u32, height: u32, params: VignetteParams) -> Self {
        let cx = f64::from(width / 2);
        let cy = f64::from(height / 2);
        Self {
            cx,
            cy,
            max_radius: (cx * cx + cy * cy).sqrt(),
            params,
        }
    }

    /// False for a 1x1 image, where every pixel is the centre.
    pub fn is_active(&self) -> bool {
        self.max_radius > 0.0
    }

    /// Mask value at pixel `(x, y)`: 255 inside `inner_ratio`, falling off
    /// linearly (truncated) beyond it, never below `floor`.
    pub fn evaluate(&self, x: u32, y: u32) -> u8 {
        if !self.is_active() {
            return 255;
        }
        let dx = f64::from(x) - self.cx;
        let dy = f64::from(y) - self.cy;
        let ratio = (dx * dx + dy * dy).sqrt() / self.max_radius;
        let p = &self.params;
        let darkness = if ratio > p.inner_ratio {
            (255.0 - (ratio - p.inner_ratio) * p.falloff).trunc()
        } else {
            255.0
        };
        darkness.clamp(f64::from(p.floor), 255.0) as u8
    }
}

/// Darken `raster` toward its edges. Alpha is untouched.
pub fn apply_vignette(raster: &mut RasterImage, params: &VignetteParams) {
    let mask = VignetteMask::new(raster.width(), raster.height(), *params);
    if !mask.is_active() {
        return;
    }
    let channels = raster.channels() as usize;
    let stride = raster.row_stride();
    let pixel_count = raster.pixel_count();
    for_each_row_mut(raster.pixels_mut(), stride, pixel_count, |y, row| {
        for (x, px) in row.chunks_exact_mut(channels).enumerate() {
            let d = u32::from(mask.evaluate(x as u32, y as u32));
            if d == 255 {
                continue;
            }
            for v in px[..3].iter_mut() {
                *v = ((u32::from(*v) * d + 127) / 255) as u8;
            }
        }
    });
}
