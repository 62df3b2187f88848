//! Progress events streamed to whoever observes a run
//!
//! Events travel over a bounded channel. The sending side never waits: if the
//! consumer falls behind the event is dropped and counted, and a closed
//! receiver simply disables further sends.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Category of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Info,
    Scrape,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Scrape => "scrape",
            Self::Error => "error",
        }
    }
}

/// One progress update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub kind: EventKind,
    pub message: String,
    pub current: usize,
    pub total: usize,
}

impl ProgressEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Info,
            message: message.into(),
            current: 0,
            total: 0,
        }
    }

    pub fn scrape(message: impl Into<String>, current: usize, total: usize) -> Self {
        Self {
            kind: EventKind::Scrape,
            message: message.into(),
            current,
            total,
        }
    }

    pub fn error(message: impl Into<String>, current: usize, total: usize) -> Self {
        Self {
            kind: EventKind::Error,
            message: message.into(),
            current,
            total,
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total > 0 {
            write!(
                f,
                "[{}] {} ({}/{})",
                self.kind.as_str(),
                self.message,
                self.current,
                self.total
            )
        } else {
            write!(f, "[{}] {}", self.kind.as_str(), self.message)
        }
    }
}

/// Non-blocking sending half of the progress channel
#[derive(Debug)]
pub struct EventSink {
    sender: Option<mpsc::Sender<ProgressEvent>>,
    dropped: usize,
}

impl EventSink {
    pub fn new(sender: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            sender: Some(sender),
            dropped: 0,
        }
    }

    /// Sends `event` without waiting for channel capacity
    pub fn emit(&mut self, event: ProgressEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped += 1;
                tracing::warn!("Progress channel full, dropped event: {}", event);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Progress receiver gone, disabling events");
                self.sender = None;
            }
        }
    }

    /// Number of events dropped because the channel was full
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns true while events can still be delivered
    pub fn is_open(&self) -> bool {
        self.sender.is_some()
    }

    /// Drops the sender, signalling end-of-stream to the receiver
    ///
    /// Calling this more than once has no further effect.
    pub fn close(&mut self) {
        if self.sender.take().is_some() && self.dropped > 0 {
            tracing::warn!("{} progress event(s) were dropped", self.dropped);
        }
    }
}

/// Creates a bounded progress channel
pub fn channel(capacity: usize) -> (EventSink, mpsc::Receiver<ProgressEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSink::new(tx), rx)
}
