use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::processing::{enhance_file, expand_inputs, FileReport};
use photolift_core::Enhancer;

/// JSON report for a batch run.
#[derive(Serialize)]
struct BatchReport<'a> {
    tool: &'static str,
    version: &'static str,
    total_images: usize,
    failed: usize,
    output_format: &'static str,
    output_directory: String,
    images: Vec<&'a FileReport>,
}

/// Enhance every input file in parallel.
pub fn cmd_enhance(
    enhancer: &Enhancer,
    inputs: Vec<PathBuf>,
    out: Option<PathBuf>,
    threads: Option<usize>,
    report: Option<PathBuf>,
) -> Result<(), String> {
    let batch_start = Instant::now();

    if inputs.is_empty() {
        return Err("No input files or directories specified".to_string());
    }
    let inputs = expand_inputs(&inputs)?;
    if inputs.is_empty() {
        return Err(
            "No supported image files found (supported: .jpg, .jpeg, .png, .bmp, .tiff, .webp)"
                .to_string(),
        );
    }
    println!("Found {} image files to process", inputs.len());

    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
    }

    let output_dir = out.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| format!("Failed to create output directory: {}", e))?;

    let processed = AtomicUsize::new(0);
    let total = inputs.len();

    let results: Vec<Result<FileReport, String>> = inputs
        .par_iter()
        .map(|input| {
            let result = enhance_file(enhancer, input, &output_dir);
            let count = processed.fetch_add(1, Ordering::SeqCst) + 1;
            match &result {
                Ok(file) => println!(
                    "[{}/{}] {} ({:.1}s)\n{}",
                    count,
                    total,
                    input.display(),
                    file.elapsed_ms as f64 / 1000.0,
                    file.summary()
                ),
                Err(e) => warn!(input = %input.display(), error = %e, "Enhancement failed"),
            }
            result
        })
        .collect();

    let mut succeeded = Vec::new();
    let mut errors = Vec::new();
    for (input, result) in inputs.iter().zip(&results) {
        match result {
            Ok(file) => succeeded.push(file),
            Err(e) => errors.push((input, e)),
        }
    }

    println!("\n========================================");
    println!("ENHANCEMENT SUMMARY");
    println!("========================================");
    println!("  Successful: {}", succeeded.len());
    println!("  Failed:     {}", errors.len());
    println!("  Output dir: {}", output_dir.display());
    println!("  Total time: {:.2}s", batch_start.elapsed().as_secs_f64());
    if !errors.is_empty() {
        println!("\nErrors:");
        for (path, error) in &errors {
            println!("  {}: {}", path.display(), error);
        }
    }

    if let Some(report_path) = report {
        let batch = BatchReport {
            tool: "photolift",
            version: env!("CARGO_PKG_VERSION"),
            total_images: succeeded.len(),
            failed: errors.len(),
            output_format: "PNG (lossless)",
            output_directory: output_dir.display().to_string(),
            images: succeeded,
        };
        let json = serde_json::to_string_pretty(&batch)
            .map_err(|e| format!("Failed to serialize report: {}", e))?;
        std::fs::write(&report_path, json)
            .map_err(|e| format!("Failed to write report {}: {}", report_path.display(), e))?;
        println!("  Report:     {}", report_path.display());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("{} of {} files failed", errors.len(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photolift_core::encode::encode_png;
    use photolift_core::RasterImage;

    #[test]
    fn test_batch_writes_outputs_and_report() {
        let input_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        for (name, rgb) in [("one.png", [40, 40, 40]), ("two.png", [150, 200, 150])] {
            let bytes = encode_png(&RasterImage::filled(6, 4, rgb)).unwrap();
            std::fs::write(input_dir.path().join(name), bytes).unwrap();
        }
        let report = out_dir.path().join("report.json");

        cmd_enhance(
            &Enhancer::default(),
            vec![input_dir.path().to_path_buf()],
            Some(out_dir.path().to_path_buf()),
            None,
            Some(report.clone()),
        )
        .unwrap();

        assert!(out_dir.path().join("one_enhanced.png").exists());
        assert!(out_dir.path().join("two_enhanced.png").exists());
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(json["total_images"], 2);
        assert_eq!(json["images"][1]["green_cast_removed"], true);
    }

    #[test]
    fn test_batch_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"garbage").unwrap();
        let err = cmd_enhance(
            &Enhancer::default(),
            vec![dir.path().to_path_buf()],
            Some(dir.path().join("out")),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, "1 of 1 files failed");
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_enhance(&Enhancer::default(), vec![dir.path().to_path_buf()], None, None, None).is_err());
    }
}
