//! Immutable configuration injected into the [`Enhancer`](crate::Enhancer).
//!
//! Every threshold, band and stage constant the pipeline uses lives here. All
//! sections deserialize with `#[serde(default)]`, so a partial JSON document
//! overrides only the values it names.

use serde::{Deserialize, Serialize};

use crate::error::EnhanceError;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    pub analysis: AnalysisConfig,
    pub severity: SeverityConfig,
    pub penalties: Penalties,
    pub stages: StageConfig,
}

impl EnhanceConfig {
    /// Reject values that would make a stage misbehave.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        let s = &self.stages;
        let finite = [
            ("analysis.green_cast_threshold", self.analysis.green_cast_threshold),
            ("analysis.underexposed_below", self.analysis.underexposed_below),
            ("analysis.overexposed_above", self.analysis.overexposed_above),
            ("stages.gentle_exposure", f64::from(s.gentle_exposure)),
            ("stages.fixed_contrast", f64::from(s.fixed_contrast)),
            ("stages.exposure.max_boost", f64::from(s.exposure.max_boost)),
            ("stages.exposure.min_cut", f64::from(s.exposure.min_cut)),
            ("stages.exposure.neutral", f64::from(s.exposure.neutral)),
            ("stages.tone_curve_steepness", f64::from(s.tone_curve_steepness)),
            ("stages.color_cast.gain", s.color_cast.gain),
            ("stages.color_cast.max_correction", s.color_cast.max_correction),
            ("stages.contrast.flat_below", s.contrast.flat_below),
            ("stages.contrast.soft_below", s.contrast.soft_below),
            ("stages.contrast.flat", f64::from(s.contrast.flat)),
            ("stages.contrast.soft", f64::from(s.contrast.soft)),
            ("stages.contrast.normal", f64::from(s.contrast.normal)),
            ("stages.saturation.green_cast", f64::from(s.saturation.green_cast)),
            ("stages.saturation.dark", f64::from(s.saturation.dark)),
            ("stages.saturation.bright", f64::from(s.saturation.bright)),
            ("stages.saturation.normal", f64::from(s.saturation.normal)),
            ("stages.saturation.dark_below", s.saturation.dark_below),
            ("stages.saturation.bright_above", s.saturation.bright_above),
            ("stages.strong_sharpen.percent", f64::from(s.strong_sharpen.percent)),
            ("stages.gentle_sharpen.percent", f64::from(s.gentle_sharpen.percent)),
            ("stages.vignette.falloff", s.vignette.falloff),
        ];
        let sev = &self.severity;
        let bands = [
            ("severity.brightness_under", &sev.brightness_under),
            ("severity.brightness_over", &sev.brightness_over),
            ("severity.contrast_under", &sev.contrast_under),
            ("severity.color_cast_over", &sev.color_cast_over),
            ("severity.saturation_under", &sev.saturation_under),
            ("severity.saturation_over", &sev.saturation_over),
            ("severity.sharpness_under", &sev.sharpness_under),
            ("severity.dynamic_range_under", &sev.dynamic_range_under),
        ];
        let band_values = bands.iter().flat_map(|(name, b)| {
            [b.severe, b.moderate, b.mild]
                .into_iter()
                .flatten()
                .map(move |v| (*name, v))
        });
        for (name, value) in finite.into_iter().chain(band_values) {
            if !value.is_finite() {
                return Err(EnhanceError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        for (name, params) in [
            ("stages.strong_sharpen", &s.strong_sharpen),
            ("stages.gentle_sharpen", &s.gentle_sharpen),
        ] {
            if !(params.radius.is_finite() && params.radius > 0.0) {
                return Err(EnhanceError::InvalidConfig(format!(
                    "{name}.radius must be positive, got {}",
                    params.radius
                )));
            }
        }
        let v = &s.vignette;
        if !(v.inner_ratio.is_finite() && v.inner_ratio >= 0.0) {
            return Err(EnhanceError::InvalidConfig(format!(
                "stages.vignette.inner_ratio must be non-negative, got {}",
                v.inner_ratio
            )));
        }
        Ok(())
    }
}

/// Thresholds applied to the raw statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// `has_green_cast` is `green_dominance > green_cast_threshold`.
    ///
    /// Independent of `SeverityConfig::color_cast_over`; the two cutoffs
    /// differ and both are honored.
    pub green_cast_threshold: f64,
    /// `is_underexposed` is `brightness < underexposed_below`.
    pub underexposed_below: f64,
    /// `is_overexposed` is `brightness > overexposed_above`.
    pub overexposed_above: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            green_cast_threshold: 15.0,
            underexposed_below: 100.0,
            overexposed_above: 180.0,
        }
    }
}

/// Three optional cut points, checked severe → moderate → mild.
///
/// Used in one direction only: either "value below bound" or "value above
/// bound", depending on which side of the table it sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bands {
    pub severe: Option<f64>,
    pub moderate: Option<f64>,
    pub mild: Option<f64>,
}

impl Bands {
    pub const fn new(severe: Option<f64>, moderate: Option<f64>, mild: Option<f64>) -> Self {
        Self {
            severe,
            moderate,
            mild,
        }
    }
}

/// Per-metric severity tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityConfig {
    pub brightness_under: Bands,
    pub brightness_over: Bands,
    pub contrast_under: Bands,
    pub color_cast_over: Bands,
    pub saturation_under: Bands,
    pub saturation_over: Bands,
    pub sharpness_under: Bands,
    pub dynamic_range_under: Bands,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            brightness_under: Bands::new(Some(70.0), Some(100.0), None),
            brightness_over: Bands::new(Some(200.0), Some(180.0), Some(160.0)),
            contrast_under: Bands::new(Some(35.0), Some(50.0), Some(65.0)),
            color_cast_over: Bands::new(Some(25.0), Some(15.0), Some(8.0)),
            saturation_under: Bands::new(Some(40.0), Some(70.0), Some(90.0)),
            saturation_over: Bands::new(None, Some(200.0), None),
            sharpness_under: Bands::new(Some(100.0), Some(300.0), Some(800.0)),
            dynamic_range_under: Bands::new(None, Some(100.0), Some(150.0)),
        }
    }
}

/// Score deduction per non-good metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Penalties {
    pub mild: u32,
    pub moderate: u32,
    pub severe: u32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            mild: 5,
            moderate: 12,
            severe: 20,
        }
    }
}

/// Adaptive exposure factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Upper limit of the boost for underexposed images.
    pub max_boost: f32,
    /// Lower limit of the cut for overexposed images.
    pub min_cut: f32,
    /// Factor when brightness is flagged but neither under- nor overexposed.
    pub neutral: f32,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            max_boost: 1.35,
            min_cut: 0.85,
            neutral: 1.05,
        }
    }
}

/// Adaptive contrast ladder: `< flat_below → flat`, `< soft_below → soft`,
/// otherwise `normal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastConfig {
    pub flat_below: f64,
    pub soft_below: f64,
    pub flat: f32,
    pub soft: f32,
    pub normal: f32,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            flat_below: 50.0,
            soft_below: 65.0,
            flat: 1.30,
            soft: 1.18,
            normal: 1.08,
        }
    }
}

/// Green cast correction strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCastConfig {
    /// Correction per unit of green dominance.
    pub gain: f64,
    /// Upper limit of the correction.
    pub max_correction: f64,
}

impl Default for ColorCastConfig {
    fn default() -> Self {
        Self {
            gain: 0.4,
            max_correction: 25.0,
        }
    }
}

/// Saturation factor selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaturationConfig {
    pub green_cast: f32,
    pub dark: f32,
    pub bright: f32,
    pub normal: f32,
    pub dark_below: f64,
    pub bright_above: f64,
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            green_cast: 1.10,
            dark: 1.20,
            bright: 1.05,
            normal: 1.15,
            dark_below: 100.0,
            bright_above: 170.0,
        }
    }
}

/// Unsharp mask parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpenParams {
    /// Gaussian sigma in pixels.
    pub radius: f32,
    /// Strength of the high-frequency residual, in percent.
    pub percent: f32,
    /// Minimum absolute residual for a channel to be touched.
    pub threshold: u8,
}

impl SharpenParams {
    pub const STRONG: Self = Self {
        radius: 1.5,
        percent: 80.0,
        threshold: 3,
    };

    pub const GENTLE: Self = Self {
        radius: 0.8,
        percent: 40.0,
        threshold: 4,
    };
}

/// Radial darkening parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteParams {
    /// Fraction of the half-diagonal left untouched.
    pub inner_ratio: f64,
    /// Mask drop per unit of ratio beyond `inner_ratio`.
    pub falloff: f64,
    /// Darkest mask value (out of 255).
    pub floor: u8,
}

impl Default for VignetteParams {
    fn default() -> Self {
        Self {
            inner_ratio: 0.6,
            falloff: 160.0,
            floor: 140,
        }
    }
}

/// Stage constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Exposure factor used when brightness is already good.
    pub gentle_exposure: f32,
    /// Contrast factor used when contrast is already good.
    pub fixed_contrast: f32,
    pub exposure: ExposureConfig,
    pub contrast: ContrastConfig,
    pub tone_curve_steepness: f32,
    pub color_cast: ColorCastConfig,
    pub saturation: SaturationConfig,
    pub strong_sharpen: SharpenParams,
    pub gentle_sharpen: SharpenParams,
    pub vignette: VignetteParams,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            gentle_exposure: 1.02,
            fixed_contrast: 1.05,
            exposure: ExposureConfig::default(),
            contrast: ContrastConfig::default(),
            tone_curve_steepness: 2.5,
            color_cast: ColorCastConfig::default(),
            saturation: SaturationConfig::default(),
            strong_sharpen: SharpenParams::STRONG,
            gentle_sharpen: SharpenParams::GENTLE,
            vignette: VignetteParams::default(),
        }
    }
}
