//! Severity classification and quality scoring.
//!
//! Maps [`DetailedStats`] onto one [`DiagnosticMetric`] per tracked metric,
//! deducts a per-severity penalty from 100 to get the quality score, and
//! derives the recommendation list.

use serde::{Deserialize, Serialize};

use crate::config::{Bands, EnhanceConfig, Penalties};
use crate::stats::DetailedStats;

/// How far a metric is from its acceptable band. Totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    #[inline]
    pub fn is_good(self) -> bool {
        self == Severity::Good
    }

    /// Score deduction for this severity.
    pub fn penalty(self, penalties: &Penalties) -> u32 {
        match self {
            Severity::Good => 0,
            Severity::Mild => penalties.mild,
            Severity::Moderate => penalties.moderate,
            Severity::Severe => penalties.severe,
        }
    }
}

/// The metrics tracked by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Brightness,
    Contrast,
    ColorCast,
    Saturation,
    Sharpness,
    DynamicRange,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Brightness,
        Metric::Contrast,
        Metric::ColorCast,
        Metric::Saturation,
        Metric::Sharpness,
        Metric::DynamicRange,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Brightness => "Brightness",
            Metric::Contrast => "Contrast",
            Metric::ColorCast => "Color Cast",
            Metric::Saturation => "Saturation",
            Metric::Sharpness => "Sharpness",
            Metric::DynamicRange => "Dynamic Range",
        }
    }

    /// Action recommended when this metric is not good.
    pub fn action(self) -> &'static str {
        match self {
            Metric::Brightness => "Adaptive Exposure Correction",
            Metric::Contrast => "Contrast Enhancement",
            Metric::ColorCast => "Green Cast Removal",
            Metric::Saturation => "Saturation Optimization",
            Metric::Sharpness => "Professional Sharpening",
            Metric::DynamicRange => "S-Curve Tone Mapping",
        }
    }
}

/// One classified metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticMetric {
    pub value: f64,
    pub severity: Severity,
    pub label: String,
    pub issue: Option<String>,
}

/// The six classified metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub brightness: DiagnosticMetric,
    pub contrast: DiagnosticMetric,
    pub color_cast: DiagnosticMetric,
    pub saturation: DiagnosticMetric,
    pub sharpness: DiagnosticMetric,
    pub dynamic_range: DiagnosticMetric,
}

impl Metrics {
    pub fn get(&self, metric: Metric) -> &DiagnosticMetric {
        match metric {
            Metric::Brightness => &self.brightness,
            Metric::Contrast => &self.contrast,
            Metric::ColorCast => &self.color_cast,
            Metric::Saturation => &self.saturation,
            Metric::Sharpness => &self.sharpness,
            Metric::DynamicRange => &self.dynamic_range,
        }
    }

    #[inline]
    pub fn severity(&self, metric: Metric) -> Severity {
        self.get(metric).severity
    }

    /// Metrics in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &DiagnosticMetric)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// A recommended action and the reason for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: String,
    pub reason: String,
}

/// Classified metrics, quality score and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub metrics: Metrics,
    /// `100 - Σ penalty`, clamped to `[0, 100]`.
    pub overall_score: u32,
    /// Number of non-good metrics.
    pub issues_found: usize,
    pub recommendations: Vec<Recommendation>,
}

/// Metrics and score only, as reported for the enhanced image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub metrics: Metrics,
    pub overall_score: u32,
}

impl From<DiagnosticsReport> for ScoreSummary {
    fn from(report: DiagnosticsReport) -> Self {
        Self {
            metrics: report.metrics,
            overall_score: report.overall_score,
        }
    }
}

/// Which side of a band table a value fell out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Low,
    High,
}

/// First match wins: severe, then moderate, then mild.
fn below(value: f64, bands: &Bands) -> Option<Severity> {
    [
        (bands.severe, Severity::Severe),
        (bands.moderate, Severity::Moderate),
        (bands.mild, Severity::Mild),
    ]
    .into_iter()
    .find_map(|(bound, sev)| bound.filter(|&b| value < b).map(|_| sev))
}

fn above(value: f64, bands: &Bands) -> Option<Severity> {
    [
        (bands.severe, Severity::Severe),
        (bands.moderate, Severity::Moderate),
        (bands.mild, Severity::Mild),
    ]
    .into_iter()
    .find_map(|(bound, sev)| bound.filter(|&b| value > b).map(|_| sev))
}

/// Low table first, then high table, otherwise good.
fn grade(value: f64, low: Option<&Bands>, high: Option<&Bands>) -> (Severity, Option<Side>) {
    if let Some(sev) = low.and_then(|b| below(value, b)) {
        return (sev, Some(Side::Low));
    }
    if let Some(sev) = high.and_then(|b| above(value, b)) {
        return (sev, Some(Side::High));
    }
    (Severity::Good, None)
}

fn issue_text(metric: Metric, severity: Severity, side: Option<Side>) -> Option<&'static str> {
    use Severity::*;
    let side = side?;
    let text = match (metric, side, severity) {
        (Metric::Brightness, Side::Low, Severe) => "Severely underexposed",
        (Metric::Brightness, Side::Low, _) => "Underexposed",
        (Metric::Brightness, Side::High, Severe) => "Severely overexposed",
        (Metric::Brightness, Side::High, Moderate) => "Overexposed",
        (Metric::Brightness, Side::High, _) => "Slightly bright",
        (Metric::Contrast, _, Severe) => "Very flat, little tonal separation",
        (Metric::Contrast, _, Moderate) => "Low contrast",
        (Metric::Contrast, _, _) => "Slightly soft contrast",
        (Metric::ColorCast, _, Severe) => "Strong green color cast",
        (Metric::ColorCast, _, Moderate) => "Green color cast",
        (Metric::ColorCast, _, _) => "Slight green tint",
        (Metric::Saturation, Side::High, _) => "Oversaturated colors",
        (Metric::Saturation, Side::Low, Severe) => "Colors heavily washed out",
        (Metric::Saturation, Side::Low, Moderate) => "Muted colors",
        (Metric::Saturation, Side::Low, _) => "Slightly muted colors",
        (Metric::Sharpness, _, Severe) => "Very blurry",
        (Metric::Sharpness, _, Moderate) => "Soft focus",
        (Metric::Sharpness, _, _) => "Slightly soft detail",
        (Metric::DynamicRange, _, Severe | Moderate) => "Compressed tonal range",
        (Metric::DynamicRange, _, _) => "Limited tonal range",
    };
    Some(text)
}

fn metric(metric: Metric, value: f64, low: Option<&Bands>, high: Option<&Bands>) -> DiagnosticMetric {
    let (severity, side) = grade(value, low, high);
    DiagnosticMetric {
        value,
        severity,
        label: metric.label().to_string(),
        issue: issue_text(metric, severity, side).map(str::to_string),
    }
}

/// Classify statistics into a diagnostics report.
pub fn classify(stats: &DetailedStats, config: &EnhanceConfig) -> DiagnosticsReport {
    let t = &config.severity;
    let base = &stats.base;

    let metrics = Metrics {
        brightness: metric(
            Metric::Brightness,
            base.overall_brightness,
            Some(&t.brightness_under),
            Some(&t.brightness_over),
        ),
        contrast: metric(Metric::Contrast, base.overall_contrast, Some(&t.contrast_under), None),
        color_cast: metric(Metric::ColorCast, base.green_dominance, None, Some(&t.color_cast_over)),
        saturation: metric(
            Metric::Saturation,
            stats.avg_saturation,
            Some(&t.saturation_under),
            Some(&t.saturation_over),
        ),
        sharpness: metric(Metric::Sharpness, stats.sharpness_score, Some(&t.sharpness_under), None),
        dynamic_range: metric(
            Metric::DynamicRange,
            stats.dynamic_range as f64,
            Some(&t.dynamic_range_under),
            None,
        ),
    };

    let penalty: u32 = metrics
        .iter()
        .map(|(_, m)| m.severity.penalty(&config.penalties))
        .sum();
    let overall_score = 100u32.saturating_sub(penalty).min(100);

    let mut recommendations: Vec<Recommendation> = metrics
        .iter()
        .filter_map(|(m, dm)| {
            dm.issue.as_ref().filter(|_| !dm.severity.is_good()).map(|issue| Recommendation {
                action: m.action().to_string(),
                reason: issue.clone(),
            })
        })
        .collect();
    recommendations.push(Recommendation {
        action: "Cinematic Color Grading".to_string(),
        reason: "Warm midtones and cool shadows for a cinematic look".to_string(),
    });
    if metrics.color_cast.severity.is_good() {
        recommendations.push(Recommendation {
            action: "Cinematic Vignette".to_string(),
            reason: "Draw attention toward the subject".to_string(),
        });
    }

    let issues_found = metrics.iter().filter(|(_, m)| !m.severity.is_good()).count();

    DiagnosticsReport {
        metrics,
        overall_score,
        issues_found,
        recommendations,
    }
}
