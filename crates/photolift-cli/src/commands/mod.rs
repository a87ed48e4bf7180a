//! Command implementations for the photolift CLI.

mod analyze;
mod enhance;
mod watch;

pub use analyze::cmd_analyze;
pub use enhance::cmd_enhance;
pub use watch::{cmd_watch, scan_once};
