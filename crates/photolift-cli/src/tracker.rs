//! Processed-file tracker for the folder watcher.
//!
//! Maps file names to a `(size, mtime)` fingerprint. A file whose current
//! fingerprint matches its entry has already been enhanced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// File name of the tracker, stored in the output directory.
pub const TRACKER_FILE: &str = ".photolift_tracker.json";

#[derive(Debug, Default)]
pub struct Tracker {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl Tracker {
    /// Load from `path`, or start empty if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, String> {
        let path = path.into();
        let entries = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read tracker {}: {}", path.display(), e))?;
            serde_json::from_str(&json)
                .map_err(|e| format!("Failed to parse tracker {}: {}", path.display(), e))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn save(&self) -> Result<(), String> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize tracker: {}", e))?;
        std::fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write tracker {}: {}", self.path.display(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// True if `name` is tracked with exactly this fingerprint.
    pub fn is_current(&self, name: &str, fingerprint: &str) -> bool {
        self.entries.get(name).is_some_and(|f| f == fingerprint)
    }

    pub fn record(&mut self, name: String, fingerprint: String) {
        self.entries.insert(name, fingerprint);
    }
}

/// `size|mtime_nanos` of a file.
pub fn fingerprint(path: &Path) -> Result<String, String> {
    let meta = std::fs::metadata(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    Ok(format!("{}|{}", meta.len(), mtime))
}

/// True if the file is non-empty and its size does not change over `settle`.
pub fn is_file_ready(path: &Path, settle: Duration) -> bool {
    let size = |p: &Path| std::fs::metadata(p).map(|m| m.len()).ok();
    let Some(before) = size(path) else {
        return false;
    };
    std::thread::sleep(settle);
    matches!(size(path), Some(after) if after == before && after > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TRACKER_FILE);

        let mut tracker = Tracker::load(&path).unwrap();
        assert!(tracker.is_empty());
        tracker.record("a.jpg".to_string(), "10|1".to_string());
        tracker.save().unwrap();

        let reloaded = Tracker::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.is_current("a.jpg", "10|1"));
        assert!(!reloaded.is_current("a.jpg", "11|1"));
        assert!(!reloaded.contains("b.jpg"));
    }

    #[test]
    fn test_corrupt_tracker_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TRACKER_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Tracker::load(&path).is_err());
    }

    #[test]
    fn test_fingerprint_changes_with_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.png");
        std::fs::write(&path, b"abc").unwrap();
        let a = fingerprint(&path).unwrap();
        std::fs::write(&path, b"abcdef").unwrap();
        let b = fingerprint(&path).unwrap();
        assert!(a.starts_with("3|"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_ready() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        let full = dir.path().join("full.png");
        std::fs::write(&empty, b"").unwrap();
        std::fs::write(&full, b"data").unwrap();
        assert!(!is_file_ready(&empty, Duration::ZERO));
        assert!(is_file_ready(&full, Duration::ZERO));
        assert!(!is_file_ready(&dir.path().join("missing.png"), Duration::ZERO));
    }
}
