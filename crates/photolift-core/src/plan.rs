//! Stage selection.
//!
//! [`plan`] turns measured statistics and their classification into an
//! ordered [`EnhancementPlan`]. Every stage carries its numeric parameters,
//! resolved once here; nothing downstream looks at the statistics again.

use serde::{Deserialize, Serialize};

use crate::adjustments::{apply_contrast, apply_exposure, apply_saturation};
use crate::config::{EnhanceConfig, SharpenParams, StageConfig, VignetteParams};
use crate::curve::{apply_tone_curve, ToneLut};
use crate::error::EnhanceError;
use crate::grading::{apply_color_cast_removal, apply_color_grading, cast_correction};
use crate::raster::RasterImage;
use crate::severity::{DiagnosticsReport, Metric};
use crate::sharpen::apply_unsharp_mask;
use crate::stats::{DetailedStats, PhotometricStats};
use crate::vignette::apply_vignette;

/// One enhancement stage with frozen parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Exposure { factor: f32, adaptive: bool },
    Contrast { factor: f32, adaptive: bool },
    ToneCurve { steepness: f32 },
    ColorCast { correction: f64 },
    ColorGrading,
    Saturation { factor: f32 },
    Sharpen { params: SharpenParams, strong: bool },
    Vignette(VignetteParams),
}

impl Stage {
    /// Display name, as listed in the applied-stage summary.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Exposure { .. } => "Adaptive Exposure Correction",
            Stage::Contrast { .. } => "Contrast Enhancement",
            Stage::ToneCurve { .. } => "S-Curve Tone Mapping",
            Stage::ColorCast { .. } => "Green Cast Removal",
            Stage::ColorGrading => "Cinematic Color Grading",
            Stage::Saturation { .. } => "Saturation Optimization",
            Stage::Sharpen { .. } => "Professional Sharpening",
            Stage::Vignette(_) => "Cinematic Vignette",
        }
    }

    /// Short identifier used in logs and errors.
    pub fn id(&self) -> &'static str {
        match self {
            Stage::Exposure { .. } => "exposure",
            Stage::Contrast { .. } => "contrast",
            Stage::ToneCurve { .. } => "tone_curve",
            Stage::ColorCast { .. } => "color_cast",
            Stage::ColorGrading => "color_grading",
            Stage::Saturation { .. } => "saturation",
            Stage::Sharpen { .. } => "sharpen",
            Stage::Vignette(_) => "vignette",
        }
    }

    /// Run this stage over `raster` in place.
    ///
    /// Only sharpening can fail; on failure `raster` is left in an
    /// unspecified state, so callers work on a copy.
    pub fn apply(&self, raster: &mut RasterImage) -> Result<(), EnhanceError> {
        match *self {
            Stage::Exposure { factor, .. } => apply_exposure(raster, factor),
            Stage::Contrast { factor, .. } => apply_contrast(raster, factor),
            Stage::ToneCurve { steepness } => apply_tone_curve(raster, &ToneLut::s_curve(steepness)),
            Stage::ColorCast { correction } => apply_color_cast_removal(raster, correction),
            Stage::ColorGrading => apply_color_grading(raster),
            Stage::Saturation { factor } => apply_saturation(raster, factor),
            Stage::Sharpen { params, .. } => apply_unsharp_mask(raster, &params)?,
            Stage::Vignette(params) => apply_vignette(raster, &params),
        }
        Ok(())
    }
}

/// Ordered list of stages to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancementPlan {
    pub stages: Vec<Stage>,
}

impl EnhancementPlan {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// True if a stage with the given identifier is planned.
    pub fn contains(&self, id: &str) -> bool {
        self.stages.iter().any(|s| s.id() == id)
    }
}

/// Exposure factor for a flagged brightness.
pub fn adaptive_exposure(stats: &PhotometricStats, config: &StageConfig) -> f32 {
    let b = stats.overall_brightness;
    let e = &config.exposure;
    if stats.is_underexposed {
        (1.0 + (128.0 - b) / 256.0).min(f64::from(e.max_boost)) as f32
    } else if stats.is_overexposed {
        (1.0 - (b - 128.0) / 384.0).max(f64::from(e.min_cut)) as f32
    } else {
        e.neutral
    }
}

/// Contrast factor for a flagged contrast.
pub fn adaptive_contrast(stats: &PhotometricStats, config: &StageConfig) -> f32 {
    let c = &config.contrast;
    if stats.overall_contrast < c.flat_below {
        c.flat
    } else if stats.overall_contrast < c.soft_below {
        c.soft
    } else {
        c.normal
    }
}

/// Saturation factor, chosen from cast and brightness.
pub fn saturation_factor(stats: &PhotometricStats, config: &StageConfig) -> f32 {
    let s = &config.saturation;
    if stats.has_green_cast {
        s.green_cast
    } else if stats.overall_brightness < s.dark_below {
        s.dark
    } else if stats.overall_brightness > s.bright_above {
        s.bright
    } else {
        s.normal
    }
}

/// Decide which stages run, in fixed order, and freeze their parameters.
pub fn plan(stats: &DetailedStats, report: &DiagnosticsReport, config: &EnhanceConfig) -> EnhancementPlan {
    let base = &stats.base;
    let sc = &config.stages;
    let flagged = |m: Metric| !report.metrics.severity(m).is_good();
    let mut stages = Vec::with_capacity(8);

    stages.push(if flagged(Metric::Brightness) {
        Stage::Exposure {
            factor: adaptive_exposure(base, sc),
            adaptive: true,
        }
    } else {
        Stage::Exposure {
            factor: sc.gentle_exposure,
            adaptive: false,
        }
    });

    stages.push(if flagged(Metric::Contrast) {
        Stage::Contrast {
            factor: adaptive_contrast(base, sc),
            adaptive: true,
        }
    } else {
        Stage::Contrast {
            factor: sc.fixed_contrast,
            adaptive: false,
        }
    });

    if flagged(Metric::DynamicRange) {
        stages.push(Stage::ToneCurve {
            steepness: sc.tone_curve_steepness,
        });
    }

    // Gated on the raw flag, not the color_cast severity.
    if base.has_green_cast {
        stages.push(Stage::ColorCast {
            correction: cast_correction(
                base.green_dominance,
                sc.color_cast.gain,
                sc.color_cast.max_correction,
            ),
        });
    }

    stages.push(Stage::ColorGrading);

    if flagged(Metric::Saturation) {
        stages.push(Stage::Saturation {
            factor: saturation_factor(base, sc),
        });
    }

    let strong = flagged(Metric::Sharpness);
    stages.push(Stage::Sharpen {
        params: if strong { sc.strong_sharpen } else { sc.gentle_sharpen },
        strong,
    });

    if !base.has_green_cast {
        stages.push(Stage::Vignette(sc.vignette));
    }

    EnhancementPlan { stages }
}
