//! Everything that leaves the process as text or files.
//!
//! # Submodules
//!
//! - [`export`]: Writes the session log to `log.csv`
//! - [`report`]: Renders predictions, trending keywords, stats and history for the terminal

pub mod export;
pub mod report;
