use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out waiting for '{selector}' to become visible")]
    WaitTimeout { selector: String },

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("DOM query '{selector}' failed: {message}")]
    Query { selector: String, message: String },

    #[error("input dispatch failed: {0}")]
    Input(String),

    #[error("run interrupted")]
    Interrupted,
}

impl BrowserError {
    /// Returns true if this error came from the run deadline or cancellation
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// A DOM element snapshot returned by `Browser::query_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    attributes: HashMap<String, String>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    /// Value of the named attribute, if present
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The element's accessible label (`aria-label`)
    pub fn accessible_label(&self) -> Option<&str> {
        self.attribute_value("aria-label")
    }
}

/// Browser automation capability
///
/// Every method is fallible and may take arbitrarily long; callers bound them
/// with the run guard. Implementations hold a single navigation context, so
/// calls are strictly sequential.
#[async_trait]
pub trait Browser: Send {
    /// Navigate the session to `url`
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Wait until an element matching `selector` is visible
    async fn wait_visible(&mut self, selector: &str) -> BrowserResult<()>;

    /// Evaluate a script in the page and return its JSON value
    ///
    /// `undefined` results are returned as `Value::Null`.
    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Snapshot every element matching `selector`
    async fn query_all(&mut self, selector: &str) -> BrowserResult<Vec<Node>>;

    /// Dispatch a pointer move to viewport coordinates
    async fn dispatch_pointer_move(&mut self, x: f64, y: f64) -> BrowserResult<()>;

    /// Scroll the element matching `feed_selector` to its bottom
    async fn scroll_feed_to_bottom(&mut self, feed_selector: &str) -> BrowserResult<()>;

    /// Release the underlying browser once a run is over
    async fn shutdown(&mut self) {}
}
