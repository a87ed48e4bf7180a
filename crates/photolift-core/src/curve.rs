//! S-curve tone mapping through a 256-entry lookup table.
//!
//! The curve is a scaled hyperbolic tangent centred on mid-gray:
//! `out = 255 * 0.5 * (1 + tanh(k * (i/255 - 0.5)))`. It is strictly
//! increasing, so the table never inverts tones, but it does not pin the
//! endpoints: with `k = 2.5` black maps to 19 and white to 236.

use crate::parallel::for_each_row_mut;
use crate::raster::RasterImage;

// ============================================================================
// LUT Type
// ============================================================================

/// Pre-computed lookup table: `lut[input] = output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneLut {
    pub lut: [u8; 256],
}

impl ToneLut {
    /// Build the S-curve table for the given steepness.
    pub fn s_curve(steepness: f32) -> Self {
        let mut lut = [0u8; 256];
        for (i, value) in lut.iter_mut().enumerate() {
            let t = i as f64 / 255.0;
            let y = 255.0 * 0.5 * (1.0 + (f64::from(steepness) * (t - 0.5)).tanh());
            *value = y.clamp(0.0, 255.0).round() as u8;
        }
        Self { lut }
    }

    #[inline]
    pub fn map(&self, v: u8) -> u8 {
        self.lut[v as usize]
    }
}

// ============================================================================
// Curve Application
// ============================================================================

/// Apply the table to R, G and B in place. Alpha is untouched.
pub fn apply_tone_curve(raster: &mut RasterImage, lut: &ToneLut) {
    let channels = raster.channels() as usize;
    let stride = raster.row_stride();
    let pixel_count = raster.pixel_count();
    for_each_row_mut(raster.pixels_mut(), stride, pixel_count, |_, row| {
        for px in row.chunks_exact_mut(channels) {
            px[0] = lut.map(px[0]);
            px[1] = lut.map(px[1]);
            px[2] = lut.map(px[2]);
        }
    });
}
