//! Photolift Core - Photometric diagnostics and adaptive enhancement
//!
//! This crate measures the photometric quality of a raster photo, classifies
//! each metric by severity, plans a set of corrections from the result and
//! applies them in a fixed order, returning the enhanced raster together with
//! before/after diagnostics.
//!
//! ## Pipeline
//! 1. [`stats::analyze_detailed`] - channel statistics, sharpness, saturation
//! 2. [`severity::classify`] - per-metric severity, score, recommendations
//! 3. [`plan::plan`] - stage selection with frozen parameters
//! 4. [`Enhancer::apply`] - stages, in order, on a copy of the input
//!
//! [`Enhancer::run`] does all four and re-measures the output.

pub mod adjustments;
pub mod config;
pub mod curve;
pub mod decode;
pub mod encode;
pub mod error;
pub mod grading;
pub mod luminance;
mod parallel;
pub mod pipeline;
pub mod plan;
pub mod raster;
pub mod severity;
pub mod sharpen;
pub mod stats;
pub mod vignette;

pub use config::{EnhanceConfig, SharpenParams, VignetteParams};
pub use error::EnhanceError;
pub use pipeline::{CancelToken, Diagnosis, EnhancementResult, Enhancer};
pub use plan::{EnhancementPlan, Stage};
pub use raster::{ChannelLayout, RasterImage};
pub use severity::{DiagnosticMetric, DiagnosticsReport, Metric, Recommendation, ScoreSummary, Severity};
pub use stats::{ChannelStatistics, DetailedStats, PhotometricStats};

/// Diagnostics report for `raster` under the default configuration.
pub fn analyze(raster: &RasterImage) -> Result<DiagnosticsReport, EnhanceError> {
    Enhancer::default().analyze(raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_uniform_gray() {
        let report = analyze(&RasterImage::filled(4, 4, [50, 50, 50])).unwrap();
        assert_eq!(report.metrics.brightness.severity, Severity::Severe);
        assert_eq!(report.metrics.brightness.value, 50.0);
        assert_eq!(report.metrics.color_cast.severity, Severity::Good);
    }

    #[test]
    fn test_analyze_rejects_gray_layout() {
        let raster = RasterImage::new(2, 2, 1, vec![0; 4]).unwrap();
        assert_eq!(
            analyze(&raster),
            Err(EnhanceError::UnsupportedFormat { channels: 1 })
        );
    }
}
