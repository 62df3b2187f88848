//! Detail-page extraction for a single candidate
//!
//! The browser-facing half visits the page and reads five raw strings out of
//! the DOM. Turning those strings into a `Record` is pure and lives in
//! `build_record` and the `clean_*`/`parse_rating` helpers.

use crate::browser::{js_string, Browser, BrowserResult};
use crate::config::SelectorConfig;
use crate::crawler::collector::Candidate;
use crate::crawler::guard::RunGuard;
use crate::crawler::pacing::PacingPolicy;
use crate::store::Record;
use serde_json::Value;

const PHONE_NOISE: [&str; 2] = ["Copy phone number", "Phone: "];
const ADDRESS_NOISE: &str = "Address: ";

/// Raw strings read from a detail page before cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDetails {
    pub phone: String,
    pub website: String,
    pub address: String,
    pub rating: String,
    pub category: String,
}

/// What to read from the matched element
#[derive(Debug, Clone, Copy)]
enum Read {
    /// `aria-label`, falling back to visible text
    Label,
    Href,
    Text,
}

fn read_script(selector: &str, read: Read) -> String {
    let expr = match read {
        Read::Label => r#"el.getAttribute("aria-label") || el.innerText"#,
        Read::Href => "el.href",
        Read::Text => "el.innerText",
    };
    format!(
        r#"(function() {{
            const el = document.querySelector({});
            if (!el) return "";
            return {} || "";
        }})()"#,
        js_string(selector),
        expr
    )
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Removes the button caption and label prefix from a phone string
pub fn clean_phone(raw: &str) -> String {
    PHONE_NOISE
        .iter()
        .fold(raw.to_string(), |acc, noise| acc.replace(noise, ""))
        .trim()
        .to_string()
}

/// Removes the label prefix from an address string
pub fn clean_address(raw: &str) -> String {
    raw.replace(ADDRESS_NOISE, "").trim().to_string()
}

/// Splits a raw rating label into `(rating, review_count)`
///
/// `"4.5 stars (128)"` gives `("4.5", "128")`. The review count is empty when
/// there is no parenthesised part, and both are empty for an empty label.
pub fn parse_rating(raw: &str) -> (String, String) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (String::new(), String::new());
    }

    let rating = raw.split(' ').next().unwrap_or_default().to_string();
    let reviews = raw
        .find('(')
        .and_then(|open| {
            let rest = &raw[open + 1..];
            rest.find(')').map(|close| rest[..close].trim().to_string())
        })
        .unwrap_or_default();

    (rating, reviews)
}

/// Builds the record for `candidate` from raw page strings
pub fn build_record(candidate: &Candidate, raw: RawDetails) -> Record {
    let (rating_value, review_count) = parse_rating(&raw.rating);
    Record {
        name: candidate.display_name.clone(),
        phone: clean_phone(&raw.phone),
        website: raw.website.trim().to_string(),
        rating_value,
        review_count,
        category: raw.category.trim().to_string(),
        address: clean_address(&raw.address),
        source_link: candidate.link.clone(),
    }
}

pub struct DetailExtractor {
    selectors: SelectorConfig,
}

impl DetailExtractor {
    pub fn new(selectors: SelectorConfig) -> Self {
        Self { selectors }
    }

    /// Visits the candidate's page and reads its details
    ///
    /// # Arguments
    ///
    /// * `browser` - Session to drive
    /// * `pacing` - Source of the pointer position and settle delay
    /// * `guard` - Run deadline and cancellation
    /// * `candidate` - The link to visit and the name to record
    ///
    /// # Returns
    ///
    /// * `Ok(Record)` - The cleaned record
    /// * `Err(BrowserError)` - Any step failed; nothing is recorded
    pub async fn extract<B>(
        &self,
        browser: &mut B,
        pacing: &mut PacingPolicy,
        guard: &RunGuard,
        candidate: &Candidate,
    ) -> BrowserResult<Record>
    where
        B: Browser + ?Sized,
    {
        guard.run(browser.navigate(&candidate.link)).await?;
        guard.run(browser.wait_visible(&self.selectors.heading)).await?;

        let (x, y) = pacing.pointer_position();
        guard.run(browser.dispatch_pointer_move(x, y)).await?;
        guard.sleep(pacing.settle_delay()).await?;

        let raw = RawDetails {
            phone: self.read(browser, guard, &self.selectors.phone, Read::Label).await?,
            website: self.read(browser, guard, &self.selectors.website, Read::Href).await?,
            address: self.read(browser, guard, &self.selectors.address, Read::Label).await?,
            rating: self.read(browser, guard, &self.selectors.rating, Read::Label).await?,
            category: self.read(browser, guard, &self.selectors.category, Read::Text).await?,
        };

        Ok(build_record(candidate, raw))
    }

    async fn read<B>(
        &self,
        browser: &mut B,
        guard: &RunGuard,
        selector: &str,
        read: Read,
    ) -> BrowserResult<String>
    where
        B: Browser + ?Sized,
    {
        let script = read_script(selector, read);
        let value = guard.run(browser.evaluate(&script)).await?;
        Ok(value_text(value))
    }
}
