//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and the
//! associated error types.

use crate::store::RecordMap;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to replace {path}: {source}")]
    Replace {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for record store implementations
///
/// A store holds the full keyed record set between runs. `persist` is always
/// handed the complete mapping, never a partial batch, so implementations may
/// replace their previous contents wholesale.
pub trait RecordStore: Send {
    /// Loads every persisted record, keyed by source link
    ///
    /// A store that has never been written returns an empty mapping.
    fn load(&self) -> StoreResult<RecordMap>;

    /// Replaces the persisted contents with `records`
    ///
    /// On success no partially written state may be observable.
    fn persist(&self, records: &RecordMap) -> StoreResult<()>;

    /// Human-readable location used in logs and progress messages
    fn location(&self) -> String;
}
