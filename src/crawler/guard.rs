//! Run-wide deadline and cancellation
//!
//! Every browser call and pacing sleep of a run goes through a `RunGuard`.
//! Once the wall-clock deadline passes or the token is cancelled, pending and
//! future operations fail fast with `BrowserError::Interrupted` so the run can
//! move straight on to persisting what it has.

use crate::browser::{BrowserError, BrowserResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Stand-in deadline for timeouts the clock cannot represent
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone)]
pub struct RunGuard {
    deadline: Instant,
    token: CancellationToken,
}

impl RunGuard {
    /// Creates a guard expiring `timeout` from now or when `token` is cancelled
    ///
    /// A timeout past the clock's range leaves only the token in charge.
    pub fn new(timeout: Duration, token: CancellationToken) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self { deadline, token }
    }

    /// Returns true once the deadline has passed or the run was cancelled
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Runs `op` unless the guard expires first
    pub async fn run<T, F>(&self, op: F) -> BrowserResult<T>
    where
        F: Future<Output = BrowserResult<T>>,
    {
        if self.is_expired() {
            return Err(BrowserError::Interrupted);
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(BrowserError::Interrupted),
            result = tokio::time::timeout_at(self.deadline, op) => {
                result.unwrap_or(Err(BrowserError::Interrupted))
            }
        }
    }

    /// Sleeps for `duration`, waking early with `Interrupted` on expiry
    pub async fn sleep(&self, duration: Duration) -> BrowserResult<()> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let guard = RunGuard::new(Duration::from_secs(60), CancellationToken::new());

        let value = guard.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = guard
            .run(async { Err::<(), _>(BrowserError::Evaluation("bad".to_string())) })
            .await
            .unwrap_err();
        assert!(!err.is_interrupted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_operation() {
        let guard = RunGuard::new(Duration::from_secs(5), CancellationToken::new());

        let result = guard
            .run(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await;

        assert!(result.unwrap_err().is_interrupted());
        assert!(guard.is_expired());
    }

    #[tokio::test]
    async fn test_cancelled_token_fails_fast() {
        let token = CancellationToken::new();
        let guard = RunGuard::new(Duration::from_secs(60), token.clone());

        token.cancel();

        assert!(guard.is_expired());
        assert!(guard
            .sleep(Duration::from_secs(30))
            .await
            .unwrap_err()
            .is_interrupted());
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_never_expires() {
        let guard = RunGuard::new(Duration::MAX, CancellationToken::new());

        assert!(!guard.is_expired());
        assert!(guard.remaining() > Duration::from_secs(86400 * 365));
        assert_eq!(guard.run(async { Ok(1) }).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down() {
        let guard = RunGuard::new(Duration::from_secs(10), CancellationToken::new());
        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(guard.remaining(), Duration::from_secs(6));
        assert!(!guard.is_expired());
    }
}
