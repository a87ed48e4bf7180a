use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::processing::{enhance_file, list_images, FileReport};
use crate::tracker::{fingerprint, is_file_ready, Tracker, TRACKER_FILE};
use photolift_core::Enhancer;

/// How long a file's size must hold still before it is picked up.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Enhance every new or changed image in `input_dir` once.
///
/// Errors on individual files are logged and skipped; the tracker is saved
/// after every success. Returns the number of files enhanced.
pub fn scan_once(
    enhancer: &Enhancer,
    input_dir: &Path,
    output_dir: &Path,
    tracker: &mut Tracker,
    settle: Duration,
) -> Result<usize, String> {
    scan_with(input_dir, tracker, settle, |path| {
        enhance_file(enhancer, path, output_dir)
    })
}

fn scan_with<F>(
    input_dir: &Path,
    tracker: &mut Tracker,
    settle: Duration,
    mut process: F,
) -> Result<usize, String>
where
    F: FnMut(&Path) -> Result<FileReport, String>,
{
    let mut enhanced = 0;
    for path in list_images(input_dir)? {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let current = match fingerprint(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!(file = %name, error = %e, "Could not stat file");
                continue;
            }
        };
        if tracker.is_current(&name, &current) {
            continue;
        }
        if !is_file_ready(&path, settle) {
            continue;
        }

        let action = if tracker.contains(&name) { "Modified" } else { "New" };
        println!("\n  [{}] {} detected, enhancing...", action, name);
        match process(&path) {
            Ok(report) => {
                println!("  Done ({:.1}s)\n{}", report.elapsed_ms as f64 / 1000.0, report.summary());
                tracker.record(name, current);
                tracker.save()?;
                enhanced += 1;
            }
            Err(e) => error!(file = %name, error = %e, "Enhancement failed"),
        }
    }
    Ok(enhanced)
}

/// Poll `input_dir` forever, enhancing new and changed images.
pub fn cmd_watch(
    enhancer: &Enhancer,
    input_dir: &Path,
    output_dir: &Path,
    interval: Duration,
) -> Result<(), String> {
    std::fs::create_dir_all(input_dir)
        .map_err(|e| format!("Failed to create input directory: {}", e))?;
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create output directory: {}", e))?;
    if same_dir(input_dir, output_dir)? {
        return Err(format!(
            "Output directory must differ from the watched directory: {}",
            output_dir.display()
        ));
    }

    let mut tracker = Tracker::load(output_dir.join(TRACKER_FILE))?;
    println!("Watching {} -> {}", input_dir.display(), output_dir.display());
    println!("  {} files already tracked, polling every {:.1}s", tracker.len(), interval.as_secs_f64());

    let initial = scan_once(enhancer, input_dir, output_dir, &mut tracker, SETTLE_DELAY)?;
    info!(enhanced = initial, "Initial scan complete");

    loop {
        std::thread::sleep(interval);
        match scan_once(enhancer, input_dir, output_dir, &mut tracker, SETTLE_DELAY) {
            Ok(0) => {}
            Ok(n) => info!(enhanced = n, tracked = tracker.len(), "Scan complete"),
            Err(e) => error!(error = %e, "Scan failed"),
        }
    }
}

fn same_dir(a: &Path, b: &Path) -> Result<bool, String> {
    let canonical = |p: &Path| {
        p.canonicalize()
            .map_err(|e| format!("Failed to resolve {}: {}", p.display(), e))
    };
    Ok(canonical(a)? == canonical(b)?)
}
