//! Luma calculation using ITU-R BT.601 coefficients.
//!
//! Every stage that needs a brightness value for a pixel (color grading,
//! saturation, the luma plane used for sharpness and dynamic range) goes
//! through these helpers so the weights live in one place.

use crate::parallel::map_rows;

/// ITU-R BT.601 coefficient for red channel in luma calculation.
pub const LUMA_R: f32 = 0.299;

/// ITU-R BT.601 coefficient for green channel in luma calculation.
pub const LUMA_G: f32 = 0.587;

/// ITU-R BT.601 coefficient for blue channel in luma calculation.
pub const LUMA_B: f32 = 0.114;

/// Calculate luma from u8 RGB values, unrounded (0.0 to 255.0).
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Calculate luma from u8 RGB values, rounded to 0-255.
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    luma(r, g, b).clamp(0.0, 255.0).round() as u8
}

/// An 8-bit single-channel plane in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaPlane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl LumaPlane {
    /// Build the luma plane of an interleaved buffer with `channels` bytes per
    /// pixel (alpha ignored).
    pub fn from_interleaved(pixels: &[u8], width: usize, height: usize, channels: usize) -> Self {
        let rows = map_rows(pixels, width * channels, |row| {
            row.chunks_exact(channels)
                .map(|px| luma_u8(px[0], px[1], px[2]))
                .collect::<Vec<u8>>()
        });
        Self {
            width,
            height,
            data: rows.concat(),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Smallest and largest value, or `(0, 0)` for an empty plane.
    pub fn min_max(&self) -> (u8, u8) {
        self.data
            .iter()
            .fold(None, |acc: Option<(u8, u8)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficients_sum_to_one() {
        let sum = LUMA_R + LUMA_G + LUMA_B;
        assert!((sum - 1.0).abs() < 1e-6, "Coefficients should sum to 1.0");
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma_u8(255, 255, 255), 255);
        assert_eq!(luma_u8(0, 0, 0), 0);
    }

    #[test]
    fn test_luma_gray_preserves_value() {
        for v in [0u8, 50, 128, 200, 255] {
            assert_eq!(luma_u8(v, v, v), v);
        }
    }

    #[test]
    fn test_luma_primaries() {
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(luma_u8(255, 0, 0), 76);
        assert_eq!(luma_u8(0, 255, 0), 150);
        assert_eq!(luma_u8(0, 0, 255), 29);
    }

    #[test]
    fn test_plane_skips_alpha() {
        let pixels = vec![10, 10, 10, 0, 200, 200, 200, 255];
        let plane = LumaPlane::from_interleaved(&pixels, 2, 1, 4);
        assert_eq!(plane.data, vec![10, 200]);
        assert_eq!(plane.min_max(), (10, 200));
    }

    #[test]
    fn test_plane_indexing() {
        let pixels = vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3];
        let plane = LumaPlane::from_interleaved(&pixels, 2, 2, 3);
        assert_eq!(plane.get(1, 0), 1);
        assert_eq!(plane.get(0, 1), 2);
    }
}
