//! # Delay Scheduler
//!
//! One-shot, cancellable pauses. All pacing in the take pipeline (the initial poll delay,
//! poll retries, details retries) goes through here so that a single cancellation token
//! disarms every armed timer of an operation at once.

use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// The pause was cut short because its token was cancelled.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Delay cancelled")]
pub struct Cancelled;

/// Produces one-shot delays bound to a cancellation token.
///
/// A delay fires once after its duration, or resolves to [`Cancelled`] as soon as the token
/// is cancelled. Cancellation always wins if both are ready, so no signal is ever delivered
/// after cancellation.
#[derive(Debug, Clone)]
pub struct DelayScheduler {
    cancel: CancellationToken,
}

impl DelayScheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Waits for `duration`.
    ///
    /// A zero duration returns immediately without touching the timer.
    pub async fn pause(&self, duration: Duration) -> Result<(), Cancelled> {
        if self.cancel.is_cancelled() {
            return Err(Cancelled);
        }
        if duration.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Cancelled),
            () = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_pause_fires_after_duration() {
        let scheduler = DelayScheduler::new(CancellationToken::new());
        let started = Instant::now();

        scheduler.pause(Duration::from_millis(250)).await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_firing() {
        let token = CancellationToken::new();
        let scheduler = DelayScheduler::new(token.clone());
        let started = Instant::now();

        let pending = tokio::spawn(async move { scheduler.pause(Duration::from_secs(60)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        assert_eq!(pending.await.unwrap(), Err(Cancelled));
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_fires() {
        let token = CancellationToken::new();
        token.cancel();
        let scheduler = DelayScheduler::new(token);

        assert_eq!(scheduler.pause(Duration::ZERO).await, Err(Cancelled));
        assert_eq!(scheduler.pause(Duration::from_millis(1)).await, Err(Cancelled));
    }

    #[tokio::test]
    async fn test_zero_duration_is_immediate() {
        let scheduler = DelayScheduler::new(CancellationToken::new());
        assert_eq!(scheduler.pause(Duration::ZERO).await, Ok(()));
    }
}
