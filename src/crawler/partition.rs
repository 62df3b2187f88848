//! Partition keys and the search query built from them

use std::collections::HashSet;
use url::form_urlencoded;

/// Splits a comma-separated key list
///
/// Keys are trimmed, blanks dropped and duplicates removed with the first
/// occurrence kept in place.
///
/// # Arguments
///
/// * `raw` - e.g. `"10001, 10002,,10001"`
///
/// # Returns
///
/// The distinct keys in input order, e.g. `["10001", "10002"]`
pub fn parse_partition_keys(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .filter(|key| seen.insert(key.to_string()))
        .map(str::to_string)
        .collect()
}

/// One geographic slice of the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub key: String,
    pub category: String,
}

impl Partition {
    pub fn new(key: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            category: category.into(),
        }
    }

    /// Search text, e.g. `"Lawyer in 10001"`
    pub fn query(&self) -> String {
        format!("{} in {}", self.category.trim(), self.key)
    }

    /// Search results URL for this partition under `base`
    pub fn search_url(&self, base: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.query().as_bytes()).collect();
        if base.ends_with('/') {
            format!("{}{}", base, encoded)
        } else {
            format!("{}/{}", base, encoded)
        }
    }
}
