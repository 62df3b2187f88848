//! Shared fixtures for integration tests
//!
//! `ScriptedBrowser` serves canned search and detail pages from memory so the
//! pipeline can be driven end to end without Chromium.

#![allow(dead_code)]

use async_trait::async_trait;
use leadsweep::browser::{Browser, BrowserError, BrowserResult, Node};
use leadsweep::config::{Config, PacingConfig};
use leadsweep::crawler::{event_channel, CrawlOrchestrator, PacingPolicy, ProgressEvent};
use leadsweep::RecordStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A detail page as the scripted browser serves it
#[derive(Debug, Clone)]
pub enum DetailPage {
    Listing {
        phone: String,
        website: String,
        address: String,
        rating: String,
        category: String,
    },
    /// Heading never appears
    Broken,
    /// Heading wait never returns in any reasonable time
    Hanging,
}

impl DetailPage {
    pub fn listing(phone: &str, rating: &str) -> Self {
        Self::Listing {
            phone: format!("Phone: {}", phone),
            website: "https://listing.example".to_string(),
            address: "Address: 1 Main St, New York, NY 10001".to_string(),
            rating: rating.to_string(),
            category: "Lawyer".to_string(),
        }
    }
}

/// Search results for one partition key
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    /// `(href, aria-label)` pairs in feed order
    pub results: Vec<(String, String)>,
    /// How many results each scroll reveals
    pub reveal_per_scroll: usize,
    pub feed_missing: bool,
}

#[derive(Debug, Default)]
pub struct Script {
    pub searches: HashMap<String, SearchPage>,
    pub details: HashMap<String, DetailPage>,
    pub current: String,
    pub scrolls: usize,
    pub calls: Vec<String>,
    pub visits: HashMap<String, usize>,
}

impl Script {
    fn current_search(&self) -> Option<&SearchPage> {
        self.searches
            .iter()
            .find(|(key, _)| self.current.ends_with(&format!("+in+{}", key)))
            .map(|(_, page)| page)
    }

    fn current_detail(&self) -> Option<&DetailPage> {
        self.details.get(&self.current)
    }
}

/// In-memory `Browser` serving scripted pages
#[derive(Clone, Default)]
pub struct ScriptedBrowser {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(
        self,
        key: &str,
        results: &[(&str, &str)],
        reveal_per_scroll: usize,
    ) -> Self {
        let page = SearchPage {
            results: results
                .iter()
                .map(|(href, label)| (href.to_string(), label.to_string()))
                .collect(),
            reveal_per_scroll,
            feed_missing: false,
        };
        self.script.lock().unwrap().searches.insert(key.to_string(), page);
        self
    }

    pub fn with_missing_feed(self, key: &str) -> Self {
        let page = SearchPage {
            feed_missing: true,
            ..SearchPage::default()
        };
        self.script.lock().unwrap().searches.insert(key.to_string(), page);
        self
    }

    pub fn with_detail(self, link: &str, page: DetailPage) -> Self {
        self.script
            .lock()
            .unwrap()
            .details
            .insert(link.to_string(), page);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn visits(&self, link: &str) -> usize {
        self.script
            .lock()
            .unwrap()
            .visits
            .get(link)
            .copied()
            .unwrap_or(0)
    }

    /// Scrolls since the last navigation
    pub fn scrolls(&self) -> usize {
        self.script.lock().unwrap().scrolls
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("navigate {}", url));
        script.current = url.to_string();
        script.scrolls = 0;
        if script.details.contains_key(url) {
            *script.visits.entry(url.to_string()).or_insert(0) += 1;
        }
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str) -> BrowserResult<()> {
        let hang = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(format!("wait {}", selector));

            let timeout = || BrowserError::WaitTimeout {
                selector: selector.to_string(),
            };
            if let Some(search) = script.current_search() {
                if search.feed_missing {
                    return Err(timeout());
                }
                false
            } else {
                match script.current_detail() {
                    Some(DetailPage::Listing { .. }) => false,
                    Some(DetailPage::Hanging) => true,
                    Some(DetailPage::Broken) | None => return Err(timeout()),
                }
            }
        };

        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(())
    }

    async fn evaluate(&mut self, script_text: &str) -> BrowserResult<Value> {
        let mut script = self.script.lock().unwrap();
        script.calls.push("evaluate".to_string());

        let Some(DetailPage::Listing {
            phone,
            website,
            address,
            rating,
            category,
        }) = script.current_detail()
        else {
            return Ok(Value::Null);
        };

        let value = if script_text.contains("Copy phone number") {
            phone
        } else if script_text.contains("authority") {
            website
        } else if script_text.contains("address") {
            address
        } else if script_text.contains("stars") {
            rating
        } else if script_text.contains("category") {
            category
        } else {
            return Ok(Value::Null);
        };

        Ok(Value::String(value.clone()))
    }

    async fn query_all(&mut self, selector: &str) -> BrowserResult<Vec<Node>> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("query {}", selector));

        let scrolls = script.scrolls;
        let Some(search) = script.current_search() else {
            return Ok(Vec::new());
        };

        let visible = (search.reveal_per_scroll * scrolls).min(search.results.len());
        Ok(search.results[..visible]
            .iter()
            .map(|(href, label)| {
                Node::new()
                    .with_attribute("href", href.clone())
                    .with_attribute("aria-label", label.clone())
            })
            .collect())
    }

    async fn dispatch_pointer_move(&mut self, x: f64, y: f64) -> BrowserResult<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("pointer {} {}", x, y));
        Ok(())
    }

    async fn scroll_feed_to_bottom(&mut self, feed_selector: &str) -> BrowserResult<()> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("scroll {}", feed_selector));
        script.scrolls += 1;
        Ok(())
    }
}

/// Default config with every delay zeroed and output under `data_dir`
pub fn test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.pacing = PacingConfig::immediate();
    config.output.data_dir = data_dir.display().to_string();
    config
}

/// Orchestrator over a scripted browser with a seeded pacing policy
pub fn orchestrator<S: RecordStore>(
    config: Config,
    browser: ScriptedBrowser,
    store: S,
) -> (
    CrawlOrchestrator<ScriptedBrowser, S>,
    mpsc::Receiver<ProgressEvent>,
) {
    let (sink, receiver) = event_channel(config.crawler.event_channel_capacity);
    let pacing = PacingPolicy::new(config.pacing.clone(), StdRng::seed_from_u64(7));
    let orchestrator =
        CrawlOrchestrator::new(config, browser, store, pacing, sink, CancellationToken::new());
    (orchestrator, receiver)
}

/// Everything left on a receiver whose sender is gone
pub fn drain(receiver: &mut mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
