//! Run orchestration - the single pipeline from store load to persist
//!
//! A run walks these phases in order:
//! - load the previous dataset (a read failure counts as empty)
//! - collect candidate links partition by partition
//! - consolidate candidates by link
//! - deep scrape each unique candidate
//! - merge with the loaded dataset and persist the whole mapping
//!
//! The deadline or cancellation cuts collection and scraping short, but the run
//! still merges and persists whatever it gathered.

use crate::browser::Browser;
use crate::config::Config;
use crate::crawler::collector::{Candidate, LinkCollector};
use crate::crawler::events::{EventSink, ProgressEvent};
use crate::crawler::extractor::DetailExtractor;
use crate::crawler::guard::RunGuard;
use crate::crawler::pacing::PacingPolicy;
use crate::crawler::partition::{parse_partition_keys, Partition};
use crate::state::RunPhase;
use crate::store::{merge, Record, RecordMap, RecordStore};
use crate::{HarvestError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What to crawl and where to save it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Dataset file name, `.csv` appended when missing
    pub file_name: String,

    /// Distinct partition keys in the order given
    pub partition_keys: Vec<String>,

    /// Business category searched in every partition
    pub category: String,
}

impl CrawlRequest {
    /// Builds a request from a comma-separated key list
    pub fn new(
        file_name: impl Into<String>,
        partition_keys: &str,
        category: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            partition_keys: parse_partition_keys(partition_keys),
            category: category.into(),
        }
    }

    /// One partition per key
    pub fn partitions(&self) -> Vec<Partition> {
        self.partition_keys
            .iter()
            .map(|key| Partition::new(key.clone(), self.category.clone()))
            .collect()
    }
}

/// Final report of a run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// `"success"`, or `"partial"` when the run was interrupted
    pub status: String,
    pub message: String,
    pub new_entries: usize,
    pub updates: usize,
    /// Scraped records identical to what was already stored
    pub skipped: usize,
    /// Candidates whose detail extraction failed
    pub failed: usize,
    /// Records in the persisted dataset
    pub total: usize,
    pub interrupted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// The full persisted dataset, sorted by link
    pub records: Vec<Record>,
}

#[derive(Debug, Default)]
struct ScrapeOutcome {
    records: Vec<Record>,
    failed: usize,
    interrupted: bool,
}

/// Drives one browser session and one record store through a crawl run
pub struct CrawlOrchestrator<B, S> {
    config: Config,
    browser: B,
    store: S,
    pacing: PacingPolicy,
    events: EventSink,
    cancel: CancellationToken,
    collector: LinkCollector,
    extractor: DetailExtractor,
    phase: RunPhase,
}

impl<B: Browser, S: RecordStore> CrawlOrchestrator<B, S> {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `browser` - Session driven for the whole run
    /// * `store` - Where the dataset is loaded from and persisted to
    /// * `pacing` - Delay policy
    /// * `events` - Progress sink, closed when the run ends
    /// * `cancel` - External cancellation
    pub fn new(
        config: Config,
        browser: B,
        store: S,
        pacing: PacingPolicy,
        events: EventSink,
        cancel: CancellationToken,
    ) -> Self {
        let collector = LinkCollector::new(config.crawler.clone(), config.selectors.clone());
        let extractor = DetailExtractor::new(config.selectors.clone());

        Self {
            config,
            browser,
            store,
            pacing,
            events,
            cancel,
            collector,
            extractor,
            phase: RunPhase::Idle,
        }
    }

    /// Current phase of the run
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hands back the browser session
    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Executes one full run
    ///
    /// The progress sink is closed before this returns, whatever the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run completed, possibly interrupted
    /// * `Err(HarvestError::NoPartitions)` - Nothing to search; no browser call was made
    /// * `Err(HarvestError::Persistence)` - The dataset could not be written
    pub async fn run(&mut self, request: &CrawlRequest) -> Result<CrawlSummary> {
        let result = self.execute(request).await;

        if let Err(e) = &result {
            tracing::error!("Run failed during {}: {}", self.phase, e);
            self.events.emit(ProgressEvent::error(e.to_string(), 0, 0));
            self.transition(RunPhase::Failed);
        }

        self.events.close();
        result
    }

    async fn execute(&mut self, request: &CrawlRequest) -> Result<CrawlSummary> {
        let started_at = Utc::now();

        let partitions = request.partitions();
        if partitions.is_empty() {
            return Err(HarvestError::NoPartitions);
        }

        let timeout = self
            .config
            .crawler
            .run_timeout_minutes
            .checked_mul(60)
            .map_or(Duration::MAX, Duration::from_secs);
        let guard = RunGuard::new(timeout, self.cancel.child_token());

        self.transition(RunPhase::LoadingStore);
        let existing = self.load_existing();

        self.transition(RunPhase::CollectingLinks);
        let (candidates, collect_interrupted) = self.collect_all(&partitions, &guard).await;

        self.transition(RunPhase::Consolidating);
        self.events.emit(ProgressEvent::info(format!(
            "Consolidated list: {} unique businesses. Starting deep scrape...",
            candidates.len()
        )));

        self.transition(RunPhase::DeepScraping);
        let scraped = self.deep_scrape(&candidates, &guard).await;

        let interrupted = collect_interrupted || scraped.interrupted;
        if interrupted {
            self.events.emit(ProgressEvent::info(format!(
                "Run stopped early; saving {} scraped records",
                scraped.records.len()
            )));
        }

        self.transition(RunPhase::Merging);
        let merged = merge(existing, scraped.records);
        tracing::info!(
            "Merged: {} new, {} updated, {} unchanged, {} failed",
            merged.new_entries,
            merged.updates,
            merged.unchanged,
            scraped.failed
        );

        self.transition(RunPhase::Persisting);
        self.store.persist(&merged.records)?;

        self.transition(RunPhase::Done);

        let mut records: Vec<Record> = merged.records.into_values().collect();
        records.sort_by(|a, b| a.source_link.cmp(&b.source_link));

        let (status, message) = if interrupted {
            ("partial", "Scraping stopped early; partial results saved")
        } else {
            ("success", "Scraping completed")
        };

        Ok(CrawlSummary {
            status: status.to_string(),
            message: message.to_string(),
            new_entries: merged.new_entries,
            updates: merged.updates,
            skipped: merged.unchanged,
            failed: scraped.failed,
            total: records.len(),
            interrupted,
            started_at,
            finished_at: Utc::now(),
            records,
        })
    }

    fn load_existing(&mut self) -> RecordMap {
        match self.store.load() {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} existing records from {}",
                    records.len(),
                    self.store.location()
                );
                records
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read {}, starting from an empty dataset: {}",
                    self.store.location(),
                    e
                );
                self.events.emit(ProgressEvent::error(
                    format!("Could not read existing data, starting fresh: {}", e),
                    0,
                    0,
                ));
                RecordMap::new()
            }
        }
    }

    /// Collects every partition in order and unions the candidates by link
    async fn collect_all(
        &mut self,
        partitions: &[Partition],
        guard: &RunGuard,
    ) -> (Vec<Candidate>, bool) {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut interrupted = false;
        let total = partitions.len();

        for (index, partition) in partitions.iter().enumerate() {
            if guard.is_expired() {
                interrupted = true;
                break;
            }

            if index > 0 && guard.sleep(self.pacing.partition_pause()).await.is_err() {
                interrupted = true;
                break;
            }

            self.events.emit(ProgressEvent::info(format!(
                "Processing {} ({}/{})...",
                partition.key,
                index + 1,
                total
            )));

            let outcome = match self
                .collector
                .collect(&mut self.browser, &mut self.pacing, guard, partition)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) if e.is_interrupted() => {
                    interrupted = true;
                    break;
                }
                Err(e) => {
                    let err = HarvestError::Partition {
                        partition: partition.key.clone(),
                        source: e,
                    };
                    tracing::warn!("{}", err);
                    self.events.emit(ProgressEvent::error(
                        err.to_string(),
                        index + 1,
                        total,
                    ));
                    continue;
                }
            };

            let found = outcome.candidates.len();
            let mut added = 0;
            for candidate in outcome.candidates {
                if seen.insert(candidate.link.clone()) {
                    candidates.push(candidate);
                    added += 1;
                }
            }

            tracing::info!(
                "Partition {}: {} results after {} scrolls, {} new",
                partition.key,
                found,
                outcome.cycles,
                added
            );
            self.events.emit(ProgressEvent::info(format!(
                "{}: found {} unique businesses",
                partition.key, added
            )));

            if outcome.interrupted {
                interrupted = true;
                break;
            }
        }

        (candidates, interrupted)
    }

    /// Visits every candidate in order, pacing before each visit
    async fn deep_scrape(&mut self, candidates: &[Candidate], guard: &RunGuard) -> ScrapeOutcome {
        let mut outcome = ScrapeOutcome::default();
        let total = candidates.len();

        for (index, candidate) in candidates.iter().enumerate() {
            let current = index + 1;

            if guard.is_expired() {
                outcome.interrupted = true;
                break;
            }

            if self.pacing.is_break(current as u64) {
                self.events.emit(ProgressEvent::info(
                    "Taking a short break (human behavior)...",
                ));
            }
            let delay = self.pacing.delay_before_detail(current as u64);
            if guard.sleep(delay).await.is_err() {
                outcome.interrupted = true;
                break;
            }

            match self
                .extractor
                .extract(&mut self.browser, &mut self.pacing, guard, candidate)
                .await
            {
                Ok(record) => {
                    tracing::debug!("Scraped {} ({})", record.name, record.source_link);
                    self.events.emit(ProgressEvent::scrape(
                        format!("Scraped {}", candidate.display_name),
                        current,
                        total,
                    ));
                    outcome.records.push(record);
                }
                Err(e) if e.is_interrupted() => {
                    outcome.interrupted = true;
                    break;
                }
                Err(e) => {
                    let err = HarvestError::Extraction {
                        link: candidate.link.clone(),
                        source: e,
                    };
                    tracing::warn!("{}", err);
                    outcome.failed += 1;
                    self.events.emit(ProgressEvent::error(
                        format!("Error scraping {}", candidate.display_name),
                        current,
                        total,
                    ));
                }
            }
        }

        outcome
    }

    fn transition(&mut self, to: RunPhase) {
        if self.phase.can_transition_to(to) {
            tracing::debug!("Run phase {} -> {}", self.phase, to);
            self.phase = to;
        } else {
            tracing::warn!("Ignoring invalid run phase change {} -> {}", self.phase, to);
        }
    }
}
