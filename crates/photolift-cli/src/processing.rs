//! Shared per-file processing for the batch runner and the watcher.

use std::path::{Path, PathBuf};
use std::time::Instant;

use photolift_core::decode::{self, is_supported_extension};
use photolift_core::encode::{encode_png, enhanced_file_name};
use photolift_core::{DiagnosticsReport, EnhanceConfig, Enhancer, ScoreSummary};
use serde::Serialize;
use tracing::debug;

/// Build an [`Enhancer`] from an optional JSON config file.
pub fn load_enhancer(config: Option<&Path>) -> Result<Enhancer, String> {
    let config = match config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
            serde_json::from_str::<EnhanceConfig>(&json)
                .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))?
        }
        None => EnhanceConfig::default(),
    };
    Enhancer::new(config).map_err(|e| e.to_string())
}

/// Expand directories (non-recursively) into supported image files.
///
/// Explicit file arguments are kept even if their extension is unknown; the
/// decoder decides. Output is sorted for a stable processing order.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(list_images(input)?);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(format!("Path not found: {}", input.display()));
        }
    }
    files.sort();
    Ok(files)
}

/// Supported image files directly inside `dir`, sorted.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("Failed to read directory {}: {}", dir.display(), e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| format!("Error reading directory entry: {}", e))?
            .path();
        if path.is_file() && is_supported_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Per-file outcome, as printed and written to the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: String,
    pub output: String,
    /// `WIDTHxHEIGHT` of the input.
    pub size: String,
    pub file_kb: f64,
    pub brightness: (f64, f64),
    pub contrast: (f64, f64),
    pub green_cast_removed: bool,
    pub applied_stages: Vec<String>,
    pub before: DiagnosticsReport,
    pub after: ScoreSummary,
    pub elapsed_ms: u64,
}

impl FileReport {
    /// Multi-line human readable summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "    -> {} ({} KB)\n    Brightness: {:.2} -> {:.2}\n    Contrast:   {:.2} -> {:.2}\n    Score:      {} -> {}",
            self.output,
            self.file_kb,
            self.brightness.0,
            self.brightness.1,
            self.contrast.0,
            self.contrast.1,
            self.before.overall_score,
            self.after.overall_score,
        );
        if self.green_cast_removed {
            out.push_str("\n    Green Cast: Removed");
        }
        out
    }
}

/// Decode, enhance and write one file into `out_dir`.
pub fn enhance_file(enhancer: &Enhancer, input: &Path, out_dir: &Path) -> Result<FileReport, String> {
    let started = Instant::now();
    let raster = decode::open(input).map_err(|e| e.to_string())?;
    let (image, result) = enhancer.run(&raster).map_err(|e| e.to_string())?;
    let (score_before, score_after) = result.score_delta();
    debug!(before = score_before, after = score_after, "Scored enhancement");

    let mut report = FileReport {
        input: input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        output: enhanced_file_name(input),
        size: format!("{}x{}", result.width, result.height),
        file_kb: 0.0,
        brightness: result.brightness_delta(),
        contrast: result.contrast_delta(),
        green_cast_removed: result.green_cast_removed(),
        applied_stages: result.applied_stages.clone(),
        before: result.before.clone(),
        after: result.after.clone(),
        elapsed_ms: 0,
    };

    let bytes = encode_png(&image).map_err(|e| e.to_string())?;
    let output_path = out_dir.join(&report.output);
    std::fs::write(&output_path, &bytes)
        .map_err(|e| format!("Failed to write {}: {}", output_path.display(), e))?;
    debug!(output = %output_path.display(), bytes = bytes.len(), "Wrote enhanced image");

    report.file_kb = (bytes.len() as f64 / 1024.0 * 10.0).round() / 10.0;
    report.elapsed_ms = started.elapsed().as_millis() as u64;
    Ok(report)
}
