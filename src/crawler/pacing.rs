//! Pacing between browser actions
//!
//! Every pause a run takes comes from here: the wait after each feed scroll,
//! the randomized delay before each detail visit with a longer break every Nth
//! visit, the pause between partitions, the settle time after a detail page
//! renders and where the pointer wanders to.

use crate::config::PacingConfig;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::Duration;

/// Randomized delay policy over an injected random source
pub struct PacingPolicy {
    config: PacingConfig,
    rng: Box<dyn RngCore + Send>,
}

impl PacingPolicy {
    /// Creates a policy drawing from `rng`
    ///
    /// # Arguments
    ///
    /// * `config` - Delay ranges and break cadence
    /// * `rng` - Random source; pass a seeded generator for reproducible runs
    pub fn new(config: PacingConfig, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            config,
            rng: Box::new(rng),
        }
    }

    /// Creates a policy seeded from OS entropy
    pub fn from_entropy(config: PacingConfig) -> Self {
        Self::new(config, StdRng::from_entropy())
    }

    /// Returns true if the detail visit at `action_index` takes the long break
    ///
    /// `action_index` is 1-based; index 0 never breaks.
    pub fn is_break(&self, action_index: u64) -> bool {
        action_index > 0 && action_index % self.config.break_every.max(1) == 0
    }

    /// Delay to wait before the detail visit at `action_index`
    pub fn delay_before_detail(&mut self, action_index: u64) -> Duration {
        if self.is_break(action_index) {
            return Duration::from_millis(self.config.break_duration_ms);
        }
        self.uniform(self.config.detail_delay_min_ms, self.config.detail_delay_max_ms)
    }

    /// Delay to wait after scrolling the results feed
    pub fn delay_after_scroll(&mut self) -> Duration {
        self.uniform(self.config.scroll_delay_min_ms, self.config.scroll_delay_max_ms)
    }

    /// Pause between two partitions
    pub fn partition_pause(&mut self) -> Duration {
        self.uniform(
            self.config.partition_pause_min_ms,
            self.config.partition_pause_max_ms,
        )
    }

    /// Time to let a detail page settle before reading it
    pub fn settle_delay(&mut self) -> Duration {
        self.uniform(self.config.settle_min_ms, self.config.settle_max_ms)
    }

    /// Random viewport coordinates for a pointer move
    pub fn pointer_position(&mut self) -> (f64, f64) {
        let range = self.config.pointer_range_px.max(1);
        let x = self.rng.gen_range(0..range);
        let y = self.rng.gen_range(0..range);
        (f64::from(x), f64::from(y))
    }

    fn uniform(&mut self, min_ms: u64, max_ms: u64) -> Duration {
        let (low, high) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Duration::from_millis(self.rng.gen_range(low..=high))
    }
}
