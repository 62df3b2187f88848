use crate::config::types::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, PacingConfig, SelectorConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_pacing_config(&config.pacing)?;
    validate_browser_config(&config.browser)?;
    validate_selectors(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Longest run a config may ask for
pub const MAX_RUN_TIMEOUT_MINUTES: u64 = 7 * 24 * 60;

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_scroll_cycles < 1 {
        return Err(ConfigError::Validation(
            "max_scroll_cycles must be >= 1".to_string(),
        ));
    }

    if config.stuck_threshold < 1 {
        return Err(ConfigError::Validation(
            "stuck_threshold must be >= 1".to_string(),
        ));
    }

    if config.run_timeout_minutes < 1 {
        return Err(ConfigError::Validation(
            "run_timeout_minutes must be >= 1".to_string(),
        ));
    }

    if config.run_timeout_minutes > MAX_RUN_TIMEOUT_MINUTES {
        return Err(ConfigError::Validation(format!(
            "run_timeout_minutes must be <= {} (one week)",
            MAX_RUN_TIMEOUT_MINUTES
        )));
    }

    if config.event_channel_capacity < 1 {
        return Err(ConfigError::Validation(
            "event_channel_capacity must be >= 1".to_string(),
        ));
    }

    let url = Url::parse(&config.search_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search_url: {}", e)))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "search_url '{}' cannot be used as a base URL",
            config.search_url
        )));
    }

    Ok(())
}

/// Validates pacing ranges
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_range(
        "scroll_delay",
        config.scroll_delay_min_ms,
        config.scroll_delay_max_ms,
    )?;
    validate_range(
        "detail_delay",
        config.detail_delay_min_ms,
        config.detail_delay_max_ms,
    )?;
    validate_range(
        "partition_pause",
        config.partition_pause_min_ms,
        config.partition_pause_max_ms,
    )?;
    validate_range("settle", config.settle_min_ms, config.settle_max_ms)?;

    if config.break_every < 1 {
        return Err(ConfigError::Validation(
            "break_every must be >= 1".to_string(),
        ));
    }

    if config.pointer_range_px < 1 {
        return Err(ConfigError::Validation(
            "pointer_range_px must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_range(name: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_min_ms ({}) must not exceed {}_max_ms ({})",
            name, min, name, max
        )));
    }
    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "user_data_dir cannot be empty".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must list at least one user agent".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    if config.viewport_width == 0 || config.viewport_height == 0 {
        return Err(ConfigError::Validation(format!(
            "viewport must be non-zero, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.wait_timeout_ms < config.poll_interval_ms {
        return Err(ConfigError::Validation(format!(
            "wait_timeout_ms ({}) must be at least poll_interval_ms ({})",
            config.wait_timeout_ms, config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates that no selector is blank
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("feed", &config.feed),
        ("result-link", &config.result_link),
        ("heading", &config.heading),
        ("phone", &config.phone),
        ("website", &config.website),
        ("address", &config.address),
        ("rating", &config.rating),
        ("category", &config.category),
    ];

    for (name, selector) in selectors {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector '{}' cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
