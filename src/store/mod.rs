//! Record store module for persisting harvested listings
//!
//! This module handles:
//! - The `Record` data model keyed by source link
//! - Merging freshly extracted records into a previously persisted set
//! - The CSV-backed store used between runs

mod csv_store;
mod traits;

pub use csv_store::{dataset_path, CsvRecordStore, CSV_HEADER};
pub use traits::{RecordStore, StoreError, StoreResult};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Records keyed by their source link
pub type RecordMap = HashMap<String, Record>;

/// One fully detail-scraped listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    pub phone: String,
    pub website: String,
    /// Numeric rating as displayed, e.g. "4.5"
    pub rating_value: String,
    /// Review count as displayed, e.g. "128"
    pub review_count: String,
    pub category: String,
    pub address: String,
    /// Stable unique key of the listing
    pub source_link: String,
}

impl Record {
    /// Returns true when `other` carries a change worth replacing this record for
    ///
    /// Only the review count and phone number are compared; other fields
    /// drifting on their own never trigger an update.
    pub fn differs_from(&self, other: &Record) -> bool {
        self.review_count != other.review_count || self.phone != other.phone
    }
}

/// Result of merging one batch of records into an existing mapping
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// The full mapping after the merge
    pub records: RecordMap,

    /// Links that were not present before
    pub new_entries: usize,

    /// Existing links whose review count or phone changed
    pub updates: usize,

    /// Existing links left untouched
    pub unchanged: usize,
}

/// Merges `incoming` records into `existing`
///
/// # Arguments
///
/// * `existing` - The previously persisted mapping
/// * `incoming` - Records extracted during this run
///
/// # Returns
///
/// The merged mapping with new, updated and unchanged counts. Records absent
/// from `incoming` are kept as they were.
pub fn merge(existing: RecordMap, incoming: impl IntoIterator<Item = Record>) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        records: existing,
        ..MergeOutcome::default()
    };

    for record in incoming {
        match outcome.records.get(&record.source_link) {
            None => {
                outcome.new_entries += 1;
                outcome
                    .records
                    .insert(record.source_link.clone(), record);
            }
            Some(stored) if stored.differs_from(&record) => {
                outcome.updates += 1;
                outcome
                    .records
                    .insert(record.source_link.clone(), record);
            }
            Some(_) => {
                outcome.unchanged += 1;
            }
        }
    }

    outcome
}
