//! Cancellation-aware suspension.
//!
//! Loops never learn about cancellation through an error: every suspend point
//! goes through [`wait_or_cancel`] and branches on the returned outcome.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

impl WaitOutcome {
    pub fn is_cancelled(self) -> bool {
        self == WaitOutcome::Cancelled
    }
}

/// Sleep for `duration` unless `cancel` fires first.
///
/// An already-cancelled token wins even for a zero duration.
pub async fn wait_or_cancel(duration: Duration, cancel: &CancellationToken) -> WaitOutcome {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => WaitOutcome::Cancelled,
        _ = tokio::time::sleep(duration) => WaitOutcome::Elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_when_not_cancelled() {
        let token = CancellationToken::new();
        let start = Instant::now();
        let outcome = wait_or_cancel(Duration::from_secs(3), &token).await;
        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_long_wait() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let outcome = wait_or_cancel(Duration::from_secs(60), &token).await;
        assert!(outcome.is_cancelled());
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_already_cancelled_wins_over_zero_wait() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(
            wait_or_cancel(Duration::ZERO, &token).await,
            WaitOutcome::Cancelled
        );
    }
}
