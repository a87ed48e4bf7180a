//! Photometric statistics extraction.
//!
//! Two levels of analysis:
//! - [`analyze`] computes per-channel means and standard deviations plus the
//!   derived brightness, contrast and green-dominance figures.
//! - [`analyze_detailed`] adds sharpness (Laplacian variance), mean HSV
//!   saturation, luma dynamic range and a noise estimate.
//!
//! All accumulation happens in integers, so results do not depend on how rows
//! are split across threads.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::AnalysisConfig;
use crate::error::EnhanceError;
use crate::luminance::LumaPlane;
use crate::parallel::{map_row_indices, map_rows};
use crate::raster::RasterImage;

/// Per-channel mean and population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    pub r_mean: f64,
    pub g_mean: f64,
    pub b_mean: f64,
    pub r_std: f64,
    pub g_std: f64,
    pub b_std: f64,
}

/// Basic statistics and the flags derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhotometricStats {
    #[serde(flatten)]
    pub channels: ChannelStatistics,
    pub overall_brightness: f64,
    pub overall_contrast: f64,
    pub green_dominance: f64,
    pub has_green_cast: bool,
    pub is_underexposed: bool,
    pub is_overexposed: bool,
}

/// Basic statistics plus the detail metrics used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailedStats {
    #[serde(flatten)]
    pub base: PhotometricStats,
    /// Variance of the 3x3 Laplacian over the valid region of the luma plane.
    pub sharpness_score: f64,
    /// Mean HSV saturation on a 0-255 scale.
    pub avg_saturation: f64,
    /// `max(luma) - min(luma)`.
    pub dynamic_range: u8,
    /// Standard deviation of luma minus its 3x3 box blur. Informational only.
    pub noise_level: f64,
}

/// Running sums for mean / variance. Exact for any realistic image size.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: u64,
    sum: i64,
    sum_sq: u64,
}

impl Moments {
    #[inline]
    fn push(&mut self, v: i64) {
        self.count += 1;
        self.sum += v;
        self.sum_sq += (v * v) as u64;
    }

    fn merge(self, other: Moments) -> Moments {
        Moments {
            count: self.count + other.count,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / self.count as f64
    }

    /// Population variance: `(n * Σx² - (Σx)²) / n²`, evaluated in i128.
    fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as i128;
        let numerator = n * self.sum_sq as i128 - (self.sum as i128) * (self.sum as i128);
        numerator.max(0) as f64 / (n * n) as f64
    }
}

/// Compute channel statistics and the derived flags.
///
/// Alpha, if present, is ignored.
pub fn analyze(raster: &RasterImage, config: &AnalysisConfig) -> Result<PhotometricStats, EnhanceError> {
    let layout = raster.validate()?;
    let channels = layout.channels();

    let per_row = map_rows(raster.pixels(), raster.row_stride(), |row| {
        let mut acc = [Moments::default(); 3];
        for px in row.chunks_exact(channels) {
            acc[0].push(px[0] as i64);
            acc[1].push(px[1] as i64);
            acc[2].push(px[2] as i64);
        }
        acc
    });
    let totals = per_row
        .into_iter()
        .fold([Moments::default(); 3], |a, b| {
            [a[0].merge(b[0]), a[1].merge(b[1]), a[2].merge(b[2])]
        });

    let channels = ChannelStatistics {
        r_mean: totals[0].mean(),
        g_mean: totals[1].mean(),
        b_mean: totals[2].mean(),
        r_std: totals[0].variance().sqrt(),
        g_std: totals[1].variance().sqrt(),
        b_std: totals[2].variance().sqrt(),
    };
    Ok(derive(channels, config))
}

/// Build the derived figures from channel statistics.
pub fn derive(channels: ChannelStatistics, config: &AnalysisConfig) -> PhotometricStats {
    let overall_brightness = (channels.r_mean + channels.g_mean + channels.b_mean) / 3.0;
    let overall_contrast = (channels.r_std + channels.g_std + channels.b_std) / 3.0;
    let green_dominance = channels.g_mean - (channels.r_mean + channels.b_mean) / 2.0;
    PhotometricStats {
        channels,
        overall_brightness,
        overall_contrast,
        green_dominance,
        has_green_cast: green_dominance > config.green_cast_threshold,
        is_underexposed: overall_brightness < config.underexposed_below,
        is_overexposed: overall_brightness > config.overexposed_above,
    }
}

/// Compute basic statistics plus sharpness, saturation, dynamic range and
/// noise.
pub fn analyze_detailed(
    raster: &RasterImage,
    config: &AnalysisConfig,
) -> Result<DetailedStats, EnhanceError> {
    let base = analyze(raster, config)?;
    let channels = raster.layout()?.channels();
    let plane = LumaPlane::from_interleaved(
        raster.pixels(),
        raster.width() as usize,
        raster.height() as usize,
        channels,
    );

    let (lo, hi) = plane.min_max();
    let stats = DetailedStats {
        base,
        sharpness_score: laplacian_variance(&plane),
        avg_saturation: mean_saturation(raster.pixels(), raster.row_stride(), channels),
        dynamic_range: hi - lo,
        noise_level: noise_level(&plane),
    };
    trace!(?stats, "detailed statistics");
    Ok(stats)
}

/// Variance of the Laplacian `[[0,1,0],[1,-4,1],[0,1,0]]` over the valid
/// `(H-2) x (W-2)` region. Images smaller than 3x3 have no valid region and
/// score 0.
pub fn laplacian_variance(plane: &LumaPlane) -> f64 {
    let (w, h) = (plane.width, plane.height);
    if w < 3 || h < 3 {
        return 0.0;
    }

    let rows = map_row_indices(h - 2, w * h, |i| {
        let y = i + 1;
        let mut acc = Moments::default();
        for x in 1..w - 1 {
            let center = plane.get(x, y) as i64;
            let lap = plane.get(x, y - 1) as i64
                + plane.get(x, y + 1) as i64
                + plane.get(x - 1, y) as i64
                + plane.get(x + 1, y) as i64
                - 4 * center;
            acc.push(lap);
        }
        acc
    });
    rows.into_iter()
        .fold(Moments::default(), Moments::merge)
        .variance()
}

/// Mean of the HSV saturation channel, 0-255 scale.
///
/// Per pixel: `S = round(255 * (max - min) / max)`, 0 for black.
pub fn mean_saturation(pixels: &[u8], row_len: usize, channels: usize) -> f64 {
    let per_row = map_rows(pixels, row_len, |row| {
        let mut acc = Moments::default();
        for px in row.chunks_exact(channels) {
            let max = px[0].max(px[1]).max(px[2]) as i64;
            let min = px[0].min(px[1]).min(px[2]) as i64;
            let s = if max == 0 {
                0
            } else {
                ((max - min) * 255 + max / 2) / max
            };
            acc.push(s);
        }
        acc
    });
    per_row
        .into_iter()
        .fold(Moments::default(), Moments::merge)
        .mean()
}

/// Standard deviation of `luma - box3x3(luma)`, with symmetric edges.
///
/// Computed as `std(9 * L - Σ3x3) / 9` so the residual stays integral.
pub fn noise_level(plane: &LumaPlane) -> f64 {
    let (w, h) = (plane.width, plane.height);
    if w == 0 || h == 0 {
        return 0.0;
    }
    // For a 3x3 window, symmetric reflection at the border picks the edge
    // pixel itself, which is the same as clamping.
    let at = |x: isize, y: isize| -> i64 {
        let cx = x.clamp(0, w as isize - 1) as usize;
        let cy = y.clamp(0, h as isize - 1) as usize;
        plane.get(cx, cy) as i64
    };

    let rows = map_row_indices(h, w * h, |y| {
        let y = y as isize;
        let mut acc = Moments::default();
        for x in 0..w as isize {
            let mut window = 0i64;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    window += at(x + dx, y + dy);
                }
            }
            acc.push(9 * at(x, y) - window);
        }
        acc
    });
    rows.into_iter()
        .fold(Moments::default(), Moments::merge)
        .variance()
        .sqrt()
        / 9.0
}
