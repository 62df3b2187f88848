//! Output module for run reports and dataset statistics
//!
//! This module handles:
//! - Printing and exporting run summaries
//! - Computing statistics over a persisted dataset

mod report;
pub mod stats;

pub use report::{format_summary, print_summary, write_summary_json};
pub use stats::{compute_statistics, print_statistics, DatasetStatistics};
