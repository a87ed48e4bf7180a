//! Shared utilities for photolift-cli
//!
//! File expansion, per-file enhancement and the watcher's tracker, used by
//! the command implementations.

pub mod commands;
pub mod processing;
pub mod tracker;

pub use processing::{enhance_file, expand_inputs, list_images, load_enhancer, FileReport};
pub use tracker::{fingerprint, is_file_ready, Tracker, TRACKER_FILE};
