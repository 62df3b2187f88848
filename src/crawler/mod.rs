//! Crawler module for the search-and-detail pipeline
//!
//! This module contains the core harvesting logic, including:
//! - Partition parsing and search URLs
//! - Feed scrolling and candidate collection
//! - Detail page extraction and cleanup
//! - Pacing, run deadline and progress events
//! - Overall run orchestration

mod collector;
mod events;
mod extractor;
mod guard;
mod job;
mod orchestrator;
mod pacing;
mod partition;

pub use collector::{candidates_from_nodes, Candidate, CollectOutcome, LinkCollector};
pub use events::{channel as event_channel, EventKind, EventSink, ProgressEvent};
pub use extractor::{
    build_record, clean_address, clean_phone, parse_rating, DetailExtractor, RawDetails,
};
pub use guard::RunGuard;
pub use job::CrawlJob;
pub use orchestrator::{CrawlOrchestrator, CrawlRequest, CrawlSummary};
pub use pacing::PacingPolicy;
pub use partition::{parse_partition_keys, Partition};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl and waits for its summary
///
/// Launches Chromium, drains progress events into the log and persists the
/// merged dataset. Use `CrawlJob` directly to observe events or cancel.
///
/// # Arguments
///
/// * `config` - Validated configuration
/// * `request` - Partitions, category and dataset file name
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - The run completed, possibly interrupted
/// * `Err(HarvestError)` - The run could not start or persist
pub async fn crawl(config: Config, request: CrawlRequest) -> Result<CrawlSummary> {
    let mut job = CrawlJob::launch(config, request).await?;

    if let Some(mut events) = job.take_events() {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                tracing::info!("{}", event);
            }
        });
    }

    job.wait().await
}
