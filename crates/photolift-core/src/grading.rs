//! Color balance stages: green cast removal and the cinematic grade.

use crate::luminance::luma;
use crate::parallel::for_each_row_mut;
use crate::raster::RasterImage;

/// Per-channel shifts applied by [`apply_color_grading`], by luma zone.
const SHADOW_SHIFT: [i16; 3] = [0, 2, 5];
const MIDTONE_SHIFT: [i16; 3] = [4, 1, -3];
const HIGHLIGHT_SHIFT: [i16; 3] = [3, 1, -2];

/// Luma below which a pixel is a shadow.
const SHADOW_LUMA: f32 = 60.0;
/// Luma at and above which a pixel is a highlight.
const HIGHLIGHT_LUMA: f32 = 180.0;

/// Near-pure green pixels, treated as backdrop.
#[inline]
pub fn is_chroma_key(r: u8, g: u8, b: u8) -> bool {
    let g = g as f32;
    g > 150.0 && g > r as f32 * 1.5 && g > b as f32 * 1.5
}

/// Correction strength for a given green dominance.
pub fn cast_correction(green_dominance: f64, gain: f64, max: f64) -> f64 {
    (green_dominance * gain).min(max)
}

/// Pull green down and red/blue up by fixed fractions of `correction`.
///
/// Chroma-key pixels are left alone. Shifted values are truncated, then
/// clamped.
pub fn apply_color_cast_removal(raster: &mut RasterImage, correction: f64) {
    let channels = raster.channels() as usize;
    let stride = raster.row_stride();
    let pixel_count = raster.pixel_count();
    let (dr, dg, db) = (correction * 0.2, correction * 0.6, correction * 0.15);
    for_each_row_mut(raster.pixels_mut(), stride, pixel_count, |_, row| {
        for px in row.chunks_exact_mut(channels) {
            let (r, g, b) = (px[0], px[1], px[2]);
            if is_chroma_key(r, g, b) {
                continue;
            }
            px[0] = (f64::from(r) + dr).trunc().clamp(0.0, 255.0) as u8;
            px[1] = (f64::from(g) - dg).trunc().clamp(0.0, 255.0) as u8;
            px[2] = (f64::from(b) + db).trunc().clamp(0.0, 255.0) as u8;
        }
    });
}

/// Warm the midtones and highlights, cool the shadows.
pub fn apply_color_grading(raster: &mut RasterImage) {
    let channels = raster.channels() as usize;
    let stride = raster.row_stride();
    let pixel_count = raster.pixel_count();
    for_each_row_mut(raster.pixels_mut(), stride, pixel_count, |_, row| {
        for px in row.chunks_exact_mut(channels) {
            let l = luma(px[0], px[1], px[2]);
            let shift = if l < SHADOW_LUMA {
                &SHADOW_SHIFT
            } else if l < HIGHLIGHT_LUMA {
                &MIDTONE_SHIFT
            } else {
                &HIGHLIGHT_SHIFT
            };
            for (v, &d) in px[..3].iter_mut().zip(shift) {
                *v = (*v as i16 + d).clamp(0, 255) as u8;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(r: u8, g: u8, b: u8) -> RasterImage {
        RasterImage::from_rgb(1, 1, vec![r, g, b]).unwrap()
    }

    #[test]
    fn test_chroma_key_detection() {
        assert!(is_chroma_key(50, 200, 50));
        assert!(!is_chroma_key(150, 200, 150)); // 200 < 225
        assert!(!is_chroma_key(10, 150, 10)); // g must exceed 150
    }

    #[test]
    fn test_correction_capped() {
        assert_eq!(cast_correction(50.0, 0.4, 25.0), 20.0);
        assert_eq!(cast_correction(100.0, 0.4, 25.0), 25.0);
    }

    #[test]
    fn test_cast_removal_shifts() {
        let mut img = px(150, 200, 150);
        apply_color_cast_removal(&mut img, 20.0);
        // r + 4, g - 12, b + 3
        assert_eq!(img.pixels(), &[154, 188, 153]);
    }

    #[test]
    fn test_cast_removal_truncates() {
        let mut img = px(100, 100, 100);
        apply_color_cast_removal(&mut img, 5.0);
        // r + 1.0, g - 3.0, b + 0.75 -> 100
        assert_eq!(img.pixels(), &[101, 97, 100]);
    }

    #[test]
    fn test_cast_removal_clamps() {
        let mut img = px(254, 5, 254);
        apply_color_cast_removal(&mut img, 25.0);
        assert_eq!(img.pixels(), &[255, 0, 255]);
    }

    #[test]
    fn test_cast_removal_skips_chroma_key() {
        let mut img = px(40, 220, 60);
        apply_color_cast_removal(&mut img, 25.0);
        assert_eq!(img.pixels(), &[40, 220, 60]);
    }

    #[test]
    fn test_grading_zones() {
        let mut shadow = px(20, 20, 20);
        apply_color_grading(&mut shadow);
        assert_eq!(shadow.pixels(), &[20, 22, 25]);

        let mut mid = px(100, 100, 100);
        apply_color_grading(&mut mid);
        assert_eq!(mid.pixels(), &[104, 101, 97]);

        let mut high = px(200, 200, 200);
        apply_color_grading(&mut high);
        assert_eq!(high.pixels(), &[203, 201, 198]);
    }

    #[test]
    fn test_grading_clamps() {
        let mut img = px(255, 255, 1);
        apply_color_grading(&mut img);
        // luma = 225.9 -> highlight
        assert_eq!(img.pixels(), &[255, 255, 0]);

        let mut img = px(0, 0, 254);
        apply_color_grading(&mut img);
        // luma = 29 -> shadow
        assert_eq!(img.pixels(), &[0, 2, 255]);
    }

    #[test]
    fn test_grading_keeps_alpha() {
        let mut img = RasterImage::from_rgba(1, 1, vec![100, 100, 100, 7]).unwrap();
        apply_color_grading(&mut img);
        assert_eq!(img.pixels(), &[104, 101, 97, 7]);
    }
}
