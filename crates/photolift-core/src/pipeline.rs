//! End-to-end enhancement runs.
//!
//! [`Enhancer`] owns a validated [`EnhanceConfig`] and drives one raster
//! through analyze → classify → plan → stages → re-analyze. It holds no
//! mutable state, so one instance can serve concurrent runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::EnhanceConfig;
use crate::error::EnhanceError;
use crate::plan::{plan, EnhancementPlan};
use crate::raster::RasterImage;
use crate::severity::{classify, DiagnosticsReport, ScoreSummary};
use crate::stats::{analyze_detailed, DetailedStats};

/// Cooperative cancellation flag, checked between stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Statistics and their classification for one raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub stats: DetailedStats,
    pub report: DiagnosticsReport,
}

/// Outcome of applying a plan.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancementResult {
    pub before: DiagnosticsReport,
    pub after: ScoreSummary,
    /// Display names of the stages that ran, in order.
    pub applied_stages: Vec<String>,
    pub plan: EnhancementPlan,
    pub stats_before: DetailedStats,
    pub stats_after: DetailedStats,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub elapsed_ms: u64,
}

impl EnhancementResult {
    /// Overall brightness before and after.
    pub fn brightness_delta(&self) -> (f64, f64) {
        (
            self.stats_before.base.overall_brightness,
            self.stats_after.base.overall_brightness,
        )
    }

    /// Overall contrast before and after.
    pub fn contrast_delta(&self) -> (f64, f64) {
        (
            self.stats_before.base.overall_contrast,
            self.stats_after.base.overall_contrast,
        )
    }

    pub fn score_delta(&self) -> (u32, u32) {
        (self.before.overall_score, self.after.overall_score)
    }

    pub fn green_cast_removed(&self) -> bool {
        self.plan.contains("color_cast")
    }
}

/// The enhancement engine.
#[derive(Debug, Clone, Default)]
pub struct Enhancer {
    config: Arc<EnhanceConfig>,
}

impl Enhancer {
    /// Create an engine after validating `config`.
    pub fn new(config: EnhanceConfig) -> Result<Self, EnhanceError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Detailed statistics plus their classification.
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height()))]
    pub fn diagnose(&self, raster: &RasterImage) -> Result<Diagnosis, EnhanceError> {
        let stats = analyze_detailed(raster, &self.config.analysis)?;
        let report = classify(&stats, &self.config);
        debug!(
            score = report.overall_score,
            issues = report.issues_found,
            "Diagnosis complete"
        );
        Ok(Diagnosis { stats, report })
    }

    /// Diagnostics report for `raster`.
    pub fn analyze(&self, raster: &RasterImage) -> Result<DiagnosticsReport, EnhanceError> {
        Ok(self.diagnose(raster)?.report)
    }

    pub fn plan(&self, stats: &DetailedStats, report: &DiagnosticsReport) -> EnhancementPlan {
        plan(stats, report, &self.config)
    }

    /// Run every stage of `plan` on a copy of `raster` and measure the
    /// result. The plan need not come from [`plan`](Self::plan).
    pub fn apply(
        &self,
        raster: &RasterImage,
        plan: &EnhancementPlan,
    ) -> Result<(RasterImage, EnhancementResult), EnhanceError> {
        self.apply_with_cancel(raster, plan, &CancelToken::new())
    }

    /// Like [`apply`](Self::apply), aborting between stages once `cancel` is
    /// set. Nothing partial is returned.
    #[instrument(skip_all, fields(width = raster.width(), height = raster.height(), stages = plan.len()))]
    pub fn apply_with_cancel(
        &self,
        raster: &RasterImage,
        plan: &EnhancementPlan,
        cancel: &CancelToken,
    ) -> Result<(RasterImage, EnhancementResult), EnhanceError> {
        let started = Instant::now();
        let before = self.diagnose(raster)?;
        self.execute(raster, before, plan.clone(), cancel, started)
    }

    /// Full run: diagnose, plan, apply, re-measure.
    pub fn run(&self, raster: &RasterImage) -> Result<(RasterImage, EnhancementResult), EnhanceError> {
        self.run_with_cancel(raster, &CancelToken::new())
    }

    #[instrument(skip_all, fields(width = raster.width(), height = raster.height()))]
    pub fn run_with_cancel(
        &self,
        raster: &RasterImage,
        cancel: &CancelToken,
    ) -> Result<(RasterImage, EnhancementResult), EnhanceError> {
        let started = Instant::now();
        let before = self.diagnose(raster)?;
        let plan = self.plan(&before.stats, &before.report);
        self.execute(raster, before, plan, cancel, started)
    }

    fn execute(
        &self,
        raster: &RasterImage,
        before: Diagnosis,
        plan: EnhancementPlan,
        cancel: &CancelToken,
        started: Instant,
    ) -> Result<(RasterImage, EnhancementResult), EnhanceError> {
        if plan.is_empty() {
            debug!("Empty plan, output equals input");
        }
        let mut image = raster.clone();
        let mut applied_stages = Vec::with_capacity(plan.len());
        for stage in &plan.stages {
            if cancel.is_cancelled() {
                info!(stage = stage.id(), "Enhancement cancelled");
                return Err(EnhanceError::Cancelled { stage: stage.id() });
            }
            debug!(stage = stage.id(), params = ?stage, "Applying stage");
            stage.apply(&mut image)?;
            applied_stages.push(stage.name().to_string());
        }
        let after = self.diagnose(&image)?;

        let result = EnhancementResult {
            applied_stages,
            plan,
            stats_before: before.stats,
            stats_after: after.stats,
            before: before.report,
            after: after.report.into(),
            width: raster.width(),
            height: raster.height(),
            channels: raster.channels(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            score_before = result.before.overall_score,
            score_after = result.after.overall_score,
            stages = result.applied_stages.len(),
            elapsed_ms = result.elapsed_ms,
            "Enhancement complete"
        );
        Ok((image, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SharpenParams;
    use crate::plan::Stage;

    fn gradient(width: u32, height: u32) -> RasterImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width.max(1)) as u8;
                pixels.extend_from_slice(&[v, (y * 7 % 256) as u8, 255 - v]);
            }
        }
        RasterImage::from_rgb(width, height, pixels).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EnhanceConfig::default();
        config.stages.strong_sharpen.radius = -1.0;
        assert!(matches!(
            Enhancer::new(config),
            Err(EnhanceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_run_input_untouched() {
        let input = gradient(16, 16);
        let copy = input.clone();
        let (image, _) = Enhancer::default().run(&input).unwrap();
        assert_eq!(input, copy);
        assert_eq!(image.width(), 16);
        assert_eq!(image.pixels().len(), copy.pixels().len());
    }

    #[test]
    fn test_applied_stages_match_plan() {
        let (_, result) = Enhancer::default().run(&gradient(12, 9)).unwrap();
        assert_eq!(result.applied_stages, result.plan.names());
        assert_eq!(result.applied_stages[0], "Adaptive Exposure Correction");
        assert!(result.applied_stages.contains(&"Cinematic Color Grading".to_string()));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let raster = RasterImage::from_rgb(0, 4, vec![]).unwrap();
        assert!(matches!(
            Enhancer::default().run(&raster),
            Err(EnhanceError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_cancel_before_first_stage() {
        let token = CancelToken::new();
        token.cancel();
        let err = Enhancer::default()
            .run_with_cancel(&gradient(8, 8), &token)
            .unwrap_err();
        assert_eq!(err, EnhanceError::Cancelled { stage: "exposure" });
    }

    #[test]
    fn test_stage_failure_is_named() {
        let plan = EnhancementPlan {
            stages: vec![
                Stage::ColorGrading,
                Stage::Sharpen {
                    params: SharpenParams {
                        radius: 0.0,
                        percent: 10.0,
                        threshold: 1,
                    },
                    strong: false,
                },
            ],
        };
        let input = gradient(4, 4);
        let err = Enhancer::default().apply(&input, &plan).unwrap_err();
        assert!(matches!(err, EnhanceError::StageFailed { stage: "sharpen", .. }));
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let input = gradient(5, 5);
        let (out, result) = Enhancer::default()
            .apply(&input, &EnhancementPlan::default())
            .unwrap();
        assert_eq!(out, input);
        assert!(result.applied_stages.is_empty());
        assert_eq!(result.after.overall_score, result.before.overall_score);
    }

    #[test]
    fn test_apply_hand_built_plan_reports_result() {
        let enhancer = Enhancer::default();
        let input = RasterImage::filled(6, 6, [50, 50, 50]);
        let plan = EnhancementPlan {
            stages: vec![
                Stage::Exposure {
                    factor: 2.0,
                    adaptive: false,
                },
                Stage::ColorGrading,
            ],
        };
        let (image, result) = enhancer.apply(&input, &plan).unwrap();

        assert_eq!(
            result.applied_stages,
            vec!["Adaptive Exposure Correction", "Cinematic Color Grading"]
        );
        assert_eq!(result.plan, plan);
        assert_eq!(result.before, enhancer.analyze(&input).unwrap());
        let after = enhancer.analyze(&image).unwrap();
        assert_eq!(result.after.overall_score, after.overall_score);
        assert_eq!(result.after.metrics, after.metrics);
        // 50 * 2 = 100, then the midtone grading shift.
        assert_eq!(&image.pixels()[..3], &[104, 101, 97]);
        assert!(result.stats_after.base.overall_brightness > result.stats_before.base.overall_brightness);
    }

    #[test]
    fn test_result_serializes_without_image() {
        let (_, result) = Enhancer::default().run(&gradient(6, 6)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("image").is_none());
        assert_eq!(json["width"], 6);
        assert!(json["before"]["metrics"]["brightness"]["value"].is_number());
        assert!(json["after"]["overall_score"].is_number());
    }

    #[test]
    fn test_deltas() {
        let (_, result) = Enhancer::default().run(&gradient(10, 10)).unwrap();
        let (b0, b1) = result.brightness_delta();
        assert_eq!(b0, result.stats_before.base.overall_brightness);
        assert_eq!(b1, result.stats_after.base.overall_brightness);
        assert_eq!(result.green_cast_removed(), result.stats_before.base.has_green_cast);
    }
}
