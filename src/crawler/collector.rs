//! Search-and-scroll harvesting of candidate links for one partition

use crate::browser::{Browser, BrowserResult, Node};
use crate::config::{CrawlerConfig, SelectorConfig};
use crate::crawler::guard::RunGuard;
use crate::crawler::pacing::PacingPolicy;
use crate::crawler::partition::Partition;
use std::collections::HashSet;

/// A detail-page link discovered on a search results page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub link: String,
    pub display_name: String,
}

/// Result of collecting one partition
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    /// Distinct candidates from the final sample, in page order
    pub candidates: Vec<Candidate>,

    /// Scroll cycles performed
    pub cycles: u32,

    /// True if scrolling stopped because the result count stopped growing
    pub stuck: bool,

    /// True if the run deadline or cancellation cut scrolling short
    pub interrupted: bool,
}

/// Keeps nodes that carry both a link and a label, first occurrence per link
pub fn candidates_from_nodes(nodes: &[Node]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for node in nodes {
        let link = node.attribute_value("href").unwrap_or_default().trim();
        let name = node.accessible_label().unwrap_or_default().trim();
        if link.is_empty() || name.is_empty() {
            continue;
        }
        if seen.insert(link.to_string()) {
            candidates.push(Candidate {
                link: link.to_string(),
                display_name: name.to_string(),
            });
        }
    }

    candidates
}

pub struct LinkCollector {
    config: CrawlerConfig,
    selectors: SelectorConfig,
}

impl LinkCollector {
    pub fn new(config: CrawlerConfig, selectors: SelectorConfig) -> Self {
        Self { config, selectors }
    }

    /// Harvests candidates for one partition
    ///
    /// Opens the partition's search view, then scrolls the results feed until
    /// the cycle bound is reached or the number of results stops growing.
    ///
    /// # Arguments
    ///
    /// * `browser` - Session to drive
    /// * `pacing` - Source of the post-scroll pause
    /// * `guard` - Run deadline and cancellation
    /// * `partition` - The key and category to search
    ///
    /// # Returns
    ///
    /// * `Ok(CollectOutcome)` - Candidates from the last sample
    /// * `Err(BrowserError)` - The search view could not be opened
    pub async fn collect<B>(
        &self,
        browser: &mut B,
        pacing: &mut PacingPolicy,
        guard: &RunGuard,
        partition: &Partition,
    ) -> BrowserResult<CollectOutcome>
    where
        B: Browser + ?Sized,
    {
        let url = partition.search_url(&self.config.search_url);
        tracing::debug!("Searching '{}' at {}", partition.query(), url);

        guard.run(browser.navigate(&url)).await?;
        guard.run(browser.wait_visible(&self.selectors.feed)).await?;

        let mut outcome = CollectOutcome::default();
        let mut sample: Vec<Node> = Vec::new();
        let mut last_count = 0usize;
        let mut unchanged = 0u32;

        for cycle in 1..=self.config.max_scroll_cycles {
            outcome.cycles = cycle;

            let scrolled = guard
                .run(browser.scroll_feed_to_bottom(&self.selectors.feed))
                .await;
            if let Err(e) = scrolled {
                if e.is_interrupted() {
                    outcome.interrupted = true;
                    break;
                }
                tracing::debug!("Scroll {} for {} failed: {}", cycle, partition.key, e);
            }

            if guard.sleep(pacing.delay_after_scroll()).await.is_err() {
                outcome.interrupted = true;
                break;
            }

            match guard.run(browser.query_all(&self.selectors.result_link)).await {
                Ok(nodes) => sample = nodes,
                Err(e) if e.is_interrupted() => {
                    outcome.interrupted = true;
                    break;
                }
                Err(e) => {
                    tracing::debug!("Sampling results for {} failed: {}", partition.key, e);
                }
            }

            if sample.len() == last_count {
                unchanged += 1;
                if unchanged >= self.config.stuck_threshold {
                    outcome.stuck = true;
                    tracing::debug!(
                        "Results for {} stopped growing at {} after {} scrolls",
                        partition.key,
                        sample.len(),
                        cycle
                    );
                    break;
                }
            } else {
                unchanged = 0;
                last_count = sample.len();
            }
        }

        outcome.candidates = candidates_from_nodes(&sample);
        Ok(outcome)
    }
}
