/// Run phase definitions for tracking orchestrator progress
///
/// A run moves strictly forward through these phases. An interrupted run still
/// walks every remaining phase so that whatever was collected gets persisted.
use std::fmt;

/// Represents the current phase of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Run created, nothing done yet
    Idle,

    /// Reading the previously persisted dataset
    LoadingStore,

    /// Harvesting search results partition by partition
    CollectingLinks,

    /// Unioning candidates from every partition by link
    Consolidating,

    /// Visiting each unique candidate for its details
    DeepScraping,

    /// Reconciling extracted records with the loaded dataset
    Merging,

    /// Writing the full dataset back
    Persisting,

    // ===== Terminal States =====
    /// Summary produced
    Done,

    /// Run aborted by a configuration or persistence error
    Failed,
}

impl RunPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this phase drives the browser
    pub fn uses_browser(&self) -> bool {
        matches!(self, Self::CollectingLinks | Self::DeepScraping)
    }

    /// The phase that normally follows this one
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::LoadingStore),
            Self::LoadingStore => Some(Self::CollectingLinks),
            Self::CollectingLinks => Some(Self::Consolidating),
            Self::Consolidating => Some(Self::DeepScraping),
            Self::DeepScraping => Some(Self::Merging),
            Self::Merging => Some(Self::Persisting),
            Self::Persisting => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Returns true if moving from this phase to `to` is allowed
    ///
    /// Only the forward step or a failure from a non-terminal phase is valid.
    pub fn can_transition_to(&self, to: RunPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingStore => "loading_store",
            Self::CollectingLinks => "collecting_links",
            Self::Consolidating => "consolidating",
            Self::DeepScraping => "deep_scraping",
            Self::Merging => "merging",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all phases in run order, followed by `Failed`
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::LoadingStore,
            Self::CollectingLinks,
            Self::Consolidating,
            Self::DeepScraping,
            Self::Merging,
            Self::Persisting,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(RunPhase::Done.is_terminal());
        assert!(RunPhase::Failed.is_terminal());

        assert!(!RunPhase::Idle.is_terminal());
        assert!(!RunPhase::DeepScraping.is_terminal());
        assert!(!RunPhase::Persisting.is_terminal());
    }

    #[test]
    fn test_uses_browser() {
        assert!(RunPhase::CollectingLinks.uses_browser());
        assert!(RunPhase::DeepScraping.uses_browser());

        assert!(!RunPhase::LoadingStore.uses_browser());
        assert!(!RunPhase::Persisting.uses_browser());
    }

    #[test]
    fn test_forward_chain_reaches_done() {
        let mut phase = RunPhase::Idle;
        let mut steps = 0;
        while let Some(next) = phase.next() {
            assert!(phase.can_transition_to(next));
            phase = next;
            steps += 1;
        }
        assert_eq!(phase, RunPhase::Done);
        assert_eq!(steps, 7);
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!RunPhase::Idle.can_transition_to(RunPhase::DeepScraping));
        assert!(!RunPhase::Merging.can_transition_to(RunPhase::CollectingLinks));
        assert!(!RunPhase::Done.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Failed.can_transition_to(RunPhase::Idle));
    }

    #[test]
    fn test_failure_allowed_from_active_phases() {
        for phase in RunPhase::all_phases() {
            if !phase.is_terminal() {
                assert!(phase.can_transition_to(RunPhase::Failed), "{}", phase);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RunPhase::LoadingStore), "loading_store");
        assert_eq!(format!("{}", RunPhase::DeepScraping), "deep_scraping");
        assert_eq!(format!("{}", RunPhase::Done), "done");
    }
}
