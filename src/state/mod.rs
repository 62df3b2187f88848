//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunPhase`: the phase a crawl run is in (loading, collecting, scraping, persisting, ...)

mod run_phase;

pub use run_phase::RunPhase;
