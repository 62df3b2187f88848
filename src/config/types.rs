use serde::Deserialize;

/// Main configuration structure for Leadsweep
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of scroll cycles per partition
    #[serde(rename = "max-scroll-cycles")]
    pub max_scroll_cycles: u32,

    /// Consecutive unchanged samples after which scrolling stops
    #[serde(rename = "stuck-threshold")]
    pub stuck_threshold: u32,

    /// Wall-clock limit for a whole run (minutes)
    #[serde(rename = "run-timeout-minutes")]
    pub run_timeout_minutes: u64,

    /// Capacity of the progress event channel
    #[serde(rename = "event-channel-capacity")]
    pub event_channel_capacity: usize,

    /// Base URL the encoded search query is appended to
    #[serde(rename = "search-url")]
    pub search_url: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_scroll_cycles: 30,
            stuck_threshold: 3,
            run_timeout_minutes: 120,
            event_channel_capacity: 1024,
            search_url: "https://www.google.com/maps/search/".to_string(),
        }
    }
}

/// Human-cadence delay configuration (all values in milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    #[serde(rename = "scroll-delay-min-ms")]
    pub scroll_delay_min_ms: u64,

    #[serde(rename = "scroll-delay-max-ms")]
    pub scroll_delay_max_ms: u64,

    #[serde(rename = "detail-delay-min-ms")]
    pub detail_delay_min_ms: u64,

    #[serde(rename = "detail-delay-max-ms")]
    pub detail_delay_max_ms: u64,

    /// Every Nth detail action takes a longer break
    #[serde(rename = "break-every")]
    pub break_every: u64,

    #[serde(rename = "break-duration-ms")]
    pub break_duration_ms: u64,

    #[serde(rename = "partition-pause-min-ms")]
    pub partition_pause_min_ms: u64,

    #[serde(rename = "partition-pause-max-ms")]
    pub partition_pause_max_ms: u64,

    /// Pause after the detail heading becomes visible
    #[serde(rename = "settle-min-ms")]
    pub settle_min_ms: u64,

    #[serde(rename = "settle-max-ms")]
    pub settle_max_ms: u64,

    /// Upper bound (exclusive) of the random pointer coordinates
    #[serde(rename = "pointer-range-px")]
    pub pointer_range_px: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            scroll_delay_min_ms: 1500,
            scroll_delay_max_ms: 3000,
            detail_delay_min_ms: 1500,
            detail_delay_max_ms: 3500,
            break_every: 10,
            break_duration_ms: 8000,
            partition_pause_min_ms: 2000,
            partition_pause_max_ms: 5000,
            settle_min_ms: 500,
            settle_max_ms: 1500,
            pointer_range_px: 500,
        }
    }
}

impl PacingConfig {
    /// A pacing profile with every delay set to zero
    ///
    /// Used by tests and by callers that drive a non-browser session.
    pub fn immediate() -> Self {
        Self {
            scroll_delay_min_ms: 0,
            scroll_delay_max_ms: 0,
            detail_delay_min_ms: 0,
            detail_delay_max_ms: 0,
            break_every: 10,
            break_duration_ms: 0,
            partition_pause_min_ms: 0,
            partition_pause_max_ms: 0,
            settle_min_ms: 0,
            settle_max_ms: 0,
            pointer_range_px: 500,
        }
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window
    pub headless: bool,

    /// Persistent profile directory (cookies, session storage)
    #[serde(rename = "user-data-dir")]
    pub user_data_dir: String,

    /// Path to a Chrome/Chromium binary; autodetected when unset
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<String>,

    /// User agents to pick from at launch
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    #[serde(rename = "viewport-width")]
    pub viewport_width: u32,

    #[serde(rename = "viewport-height")]
    pub viewport_height: u32,

    #[serde(rename = "viewport-width-jitter")]
    pub viewport_width_jitter: u32,

    #[serde(rename = "viewport-height-jitter")]
    pub viewport_height_jitter: u32,

    /// Maximum time to wait for an element to become visible
    #[serde(rename = "wait-timeout-ms")]
    pub wait_timeout_ms: u64,

    /// Interval between visibility checks
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            user_data_dir: "./chrome_data".to_string(),
            chrome_executable: None,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/113.0.0.0 Safari/537.36".to_string(),
            ],
            accept_language: "en-US,en;q=0.9".to_string(),
            viewport_width: 1280,
            viewport_height: 800,
            viewport_width_jitter: 200,
            viewport_height_jitter: 100,
            wait_timeout_ms: 30_000,
            poll_interval_ms: 250,
        }
    }
}

/// DOM selectors for the search feed and the listing detail view
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Scrollable results feed
    pub feed: String,

    /// Result links inside the feed
    #[serde(rename = "result-link")]
    pub result_link: String,

    /// Heading that signals the detail view has rendered
    pub heading: String,

    pub phone: String,
    pub website: String,
    pub address: String,
    pub rating: String,
    pub category: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            feed: "div[role='feed']".to_string(),
            result_link: "a[href*=\"/maps/place/\"]".to_string(),
            heading: "h1".to_string(),
            phone: "button[data-tooltip='Copy phone number']".to_string(),
            website: "a[data-item-id='authority']".to_string(),
            address: "button[data-item-id='address']".to_string(),
            rating: "div[role=\"img\"][aria-label*=\"stars\"]".to_string(),
            category: "button[jsaction*='category']".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory dataset files are resolved against
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
        }
    }
}
