//! Run summary reporting
//!
//! Renders a `CrawlSummary` as text for the terminal and writes it as JSON for
//! other tools.

use crate::crawler::CrawlSummary;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Formats a run summary as plain text
///
/// # Arguments
///
/// * `summary` - The summary of a finished run
///
/// # Returns
///
/// A multi-line report without the record list
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();

    out.push_str("=== Run Summary ===\n\n");
    out.push_str(&format!("Status: {} ({})\n", summary.status, summary.message));
    out.push_str(&format!("Started: {}\n", summary.started_at.to_rfc3339()));
    out.push_str(&format!("Finished: {}\n", summary.finished_at.to_rfc3339()));

    let elapsed = summary.finished_at - summary.started_at;
    out.push_str(&format!("Duration: {} seconds\n", elapsed.num_seconds()));
    if summary.interrupted {
        out.push_str("Interrupted: yes, partial results saved\n");
    }
    out.push('\n');

    out.push_str(&format!("New entries: {}\n", summary.new_entries));
    out.push_str(&format!("Updated: {}\n", summary.updates));
    out.push_str(&format!("Unchanged: {}\n", summary.skipped));
    out.push_str(&format!("Failed: {}\n", summary.failed));
    out.push_str(&format!("Total records in file: {}\n", summary.total));

    out
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", format_summary(summary));
}

/// Writes a run summary, records included, as pretty-printed JSON
///
/// # Arguments
///
/// * `summary` - The summary to write
/// * `path` - Destination file, overwritten if present
pub fn write_summary_json(summary: &CrawlSummary, path: &Path) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn sample_summary() -> CrawlSummary {
        let started_at = Utc::now();
        CrawlSummary {
            status: "success".to_string(),
            message: "Scraping completed".to_string(),
            new_entries: 2,
            updates: 1,
            skipped: 3,
            failed: 1,
            total: 6,
            interrupted: false,
            started_at,
            finished_at: started_at + Duration::seconds(90),
            records: vec![Record {
                name: "Cafe A".to_string(),
                source_link: "https://maps.example/place/a".to_string(),
                ..Record::default()
            }],
        }
    }

    #[test]
    fn test_format_summary() {
        let text = format_summary(&sample_summary());

        assert!(text.contains("Status: success (Scraping completed)"));
        assert!(text.contains("Duration: 90 seconds"));
        assert!(text.contains("New entries: 2"));
        assert!(text.contains("Unchanged: 3"));
        assert!(text.contains("Total records in file: 6"));
        assert!(!text.contains("Interrupted"));
    }

    #[test]
    fn test_format_interrupted_summary() {
        let mut summary = sample_summary();
        summary.interrupted = true;

        assert!(format_summary(&summary).contains("Interrupted: yes"));
    }

    #[test]
    fn test_write_summary_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");

        write_summary_json(&sample_summary(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["newEntries"], 2);
        assert_eq!(value["skipped"], 3);
        assert_eq!(value["interrupted"], false);
        assert_eq!(value["records"][0]["sourceLink"], "https://maps.example/place/a");
        assert!(value["startedAt"].is_string());
    }
}
