//! Configuration module for Leadsweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional; `Config::default()` mirrors the tool's
//! built-in behaviour.
//!
//! # Example
//!
//! ```no_run
//! use leadsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("leadsweep.toml")).unwrap();
//! println!("Max scroll cycles: {}", config.crawler.max_scroll_cycles);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, PacingConfig, SelectorConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
