use crate::config::BrowserConfig;
use rand::seq::SliceRandom;
use rand::Rng;

/// Hides the `navigator.webdriver` flag on every new document
pub const WEBDRIVER_MASK_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined});";

/// Per-session browser fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub accept_language: String,
}

impl Fingerprint {
    /// Picks a user agent and a jittered viewport for one session
    pub fn randomized<R: Rng + ?Sized>(config: &BrowserConfig, rng: &mut R) -> Self {
        let user_agent = config
            .user_agents
            .choose(rng)
            .cloned()
            .unwrap_or_default();

        Self {
            user_agent,
            viewport_width: config.viewport_width + jitter(rng, config.viewport_width_jitter),
            viewport_height: config.viewport_height + jitter(rng, config.viewport_height_jitter),
            accept_language: config.accept_language.clone(),
        }
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, max: u32) -> u32 {
    if max == 0 {
        0
    } else {
        rng.gen_range(0..max)
    }
}
