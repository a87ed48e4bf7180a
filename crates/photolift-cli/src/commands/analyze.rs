use std::path::Path;

use photolift_core::{decode, DetailedStats, DiagnosticsReport, Enhancer, Severity};
use serde::Serialize;

/// Analysis result for JSON output.
#[derive(Serialize)]
pub struct AnalysisOutput<'a> {
    pub file: String,
    pub dimensions: [u32; 2],
    pub channels: u8,
    pub stats: &'a DetailedStats,
    pub report: &'a DiagnosticsReport,
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Good => "ok",
        Severity::Mild => "mild",
        Severity::Moderate => "MODERATE",
        Severity::Severe => "SEVERE",
    }
}

/// Print the diagnostics report for one image.
pub fn cmd_analyze(enhancer: &Enhancer, input: &Path, json: bool) -> Result<(), String> {
    let raster = decode::open(input).map_err(|e| e.to_string())?;
    let diagnosis = enhancer.diagnose(&raster).map_err(|e| e.to_string())?;

    if json {
        let output = AnalysisOutput {
            file: input.display().to_string(),
            dimensions: [raster.width(), raster.height()],
            channels: raster.channels(),
            stats: &diagnosis.stats,
            report: &diagnosis.report,
        };
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("Failed to serialize analysis: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    let report = &diagnosis.report;
    println!("{} ({}x{})", input.display(), raster.width(), raster.height());
    println!("  Quality score: {}/100 ({} issues)", report.overall_score, report.issues_found);
    println!();
    for (_, metric) in report.metrics.iter() {
        println!(
            "  {:<14} {:>9.2}  [{}]{}",
            metric.label,
            metric.value,
            severity_tag(metric.severity),
            metric
                .issue
                .as_deref()
                .map(|i| format!("  {}", i))
                .unwrap_or_default()
        );
    }
    println!();
    println!("  Recommendations:");
    for rec in &report.recommendations {
        println!("    - {}: {}", rec.action, rec.reason);
    }
    Ok(())
}
