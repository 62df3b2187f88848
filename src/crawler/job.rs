//! A crawl run spawned as a task with an event stream and awaitable result

use crate::browser::{Browser, ChromiumSession, Fingerprint};
use crate::config::Config;
use crate::crawler::events::{self, ProgressEvent};
use crate::crawler::orchestrator::{CrawlOrchestrator, CrawlRequest, CrawlSummary};
use crate::crawler::pacing::PacingPolicy;
use crate::store::{dataset_path, CsvRecordStore, RecordStore};
use crate::{HarvestError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running crawl
///
/// Progress events arrive on the receiver returned by `take_events`; the
/// stream ends when the run finishes. `wait` yields the summary.
pub struct CrawlJob {
    events: Option<mpsc::Receiver<ProgressEvent>>,
    handle: JoinHandle<Result<CrawlSummary>>,
    cancel: CancellationToken,
}

impl CrawlJob {
    /// Spawns a run over the given browser and store
    ///
    /// The browser is shut down once the run is over.
    pub fn spawn<B, S>(
        config: Config,
        browser: B,
        store: S,
        pacing: PacingPolicy,
        request: CrawlRequest,
    ) -> Self
    where
        B: Browser + 'static,
        S: RecordStore + 'static,
    {
        let (sink, receiver) = events::channel(config.crawler.event_channel_capacity);
        let cancel = CancellationToken::new();
        let mut orchestrator =
            CrawlOrchestrator::new(config, browser, store, pacing, sink, cancel.clone());

        let handle = tokio::spawn(async move {
            let result = orchestrator.run(&request).await;
            orchestrator.into_browser().shutdown().await;
            result
        });

        Self {
            events: Some(receiver),
            handle,
            cancel,
        }
    }

    /// Launches Chromium and spawns a run writing to the configured dataset
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `request` - Partitions, category and dataset file name
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlJob)` - The run is under way
    /// * `Err(HarvestError::NoPartitions)` - Rejected before launching a browser
    /// * `Err(HarvestError::Browser)` - Chromium could not be started
    pub async fn launch(config: Config, request: CrawlRequest) -> Result<Self> {
        if request.partition_keys.is_empty() {
            return Err(HarvestError::NoPartitions);
        }

        let mut rng = StdRng::from_entropy();
        let fingerprint = Fingerprint::randomized(&config.browser, &mut rng);
        let session = ChromiumSession::launch(&config.browser, &fingerprint).await?;

        let path = dataset_path(Path::new(&config.output.data_dir), &request.file_name);
        let store = CsvRecordStore::new(path);
        let pacing = PacingPolicy::new(config.pacing.clone(), rng);

        Ok(Self::spawn(config, session, store, pacing, request))
    }

    /// Takes the progress receiver; later calls return `None`
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<ProgressEvent>> {
        self.events.take()
    }

    /// Token that stops the run early when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops the run; it still persists what it collected
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the run to end
    pub async fn wait(self) -> Result<CrawlSummary> {
        self.handle.await?
    }
}
