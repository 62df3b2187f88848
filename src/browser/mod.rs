//! Browser capability used by both collection phases
//!
//! The crawler never talks to Chromium directly. It drives the `Browser`
//! trait, which the chromiumoxide-backed `ChromiumSession` implements for real
//! runs and which tests implement with scripted pages.

mod chromium;
mod stealth;
mod traits;

pub use chromium::ChromiumSession;
pub use stealth::{Fingerprint, WEBDRIVER_MASK_SCRIPT};
pub use traits::{Browser, BrowserError, BrowserResult, Node};

/// Quotes `value` as a JavaScript string literal
///
/// Selectors are embedded into evaluated scripts through this so quotes in
/// attribute selectors survive.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
