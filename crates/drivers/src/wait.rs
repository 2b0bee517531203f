//! Bounded, cancellable condition polling.
//!
//! A wait starts in `Polling` and ends in exactly one of `Satisfied`,
//! `TimedOut` or `Cancelled`. Each tick evaluates the condition first, then
//! the cancellation signal, then the deadline, and only then sleeps. A sleep
//! never runs past the deadline and is cut short by cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use harvest_core::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Polling,
    Satisfied,
    TimedOut,
    Cancelled,
}

impl WaitState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WaitState::Polling)
    }

    /// Map a terminal state to the caller-facing outcome.
    pub fn into_result(self, what: &str) -> Result<()> {
        match self {
            WaitState::Satisfied => Ok(()),
            WaitState::TimedOut => Err(Error::TimeoutExceeded(what.to_string())),
            WaitState::Cancelled => Err(Error::Cancelled(what.to_string())),
            WaitState::Polling => Err(Error::Driver(format!("{} did not finish", what))),
        }
    }
}

/// Time source for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct Waiter {
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl Waiter {
    pub fn new(clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            clock,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Poll `condition` until it holds, `timeout` elapses or `cancel` fires.
    ///
    /// Errors from the condition itself end the wait immediately and are
    /// returned as-is; they are not a terminal state.
    pub async fn poll<F, Fut>(
        &self,
        what: &str,
        timeout: Duration,
        cancel: &CancellationToken,
        mut condition: F,
    ) -> Result<WaitState>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<bool>> + Send,
    {
        let started = self.clock.now();
        let deadline = started + timeout;
        let mut ticks: u32 = 0;
        debug!(what = what, timeout_ms = timeout.as_millis() as u64, "Wait polling");

        let state = loop {
            ticks += 1;
            if condition().await? {
                break WaitState::Satisfied;
            }
            if cancel.is_cancelled() {
                break WaitState::Cancelled;
            }
            let now = self.clock.now();
            if now >= deadline {
                break WaitState::TimedOut;
            }

            let nap = self.interval.min(deadline - now);
            tokio::select! {
                _ = cancel.cancelled() => break WaitState::Cancelled,
                _ = self.clock.sleep(nap) => {}
            }
        };

        debug!(
            what = what,
            state = ?state,
            ticks = ticks,
            elapsed_ms = self.clock.now().saturating_duration_since(started).as_millis() as u64,
            "Wait finished"
        );
        Ok(state)
    }

    /// `poll` mapped to success or a typed timeout/cancellation failure.
    pub async fn wait<F, Fut>(
        &self,
        what: &str,
        timeout: Duration,
        cancel: &CancellationToken,
        condition: F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<bool>> + Send,
    {
        self.poll(what, timeout, cancel, condition)
            .await?
            .into_result(what)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeClock;
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn waiter(clock: &Arc<FakeClock>, interval_ms: u64) -> Waiter {
        Waiter::new(clock.clone(), Duration::from_millis(interval_ms))
    }

    #[tokio::test]
    async fn test_satisfied_after_some_ticks() {
        let clock = Arc::new(FakeClock::new());
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let state = waiter(&clock, 50)
            .poll("ready", Duration::from_millis(1000), &cancel, || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(n >= 3) }
            })
            .await
            .unwrap();

        assert_eq!(state, WaitState::Satisfied);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_times_out_at_deadline_without_overshoot() {
        let clock = Arc::new(FakeClock::new());
        let cancel = CancellationToken::new();

        let state = waiter(&clock, 30)
            .poll("never", Duration::from_millis(100), &cancel, || async { Ok(false) })
            .await
            .unwrap();

        assert_eq!(state, WaitState::TimedOut);
        assert_eq!(clock.elapsed(), Duration::from_millis(100));
        // Last nap is trimmed to the remaining time.
        assert_eq!(clock.sleeps().last(), Some(&Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn test_cancel_from_condition() {
        let clock = Arc::new(FakeClock::new());
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let state = waiter(&clock, 50)
            .poll("cancelled", Duration::from_secs(10), &cancel, || {
                if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                    cancel.cancel();
                }
                async { Ok(false) }
            })
            .await
            .unwrap();

        assert_eq!(state, WaitState::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(clock.elapsed() <= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_satisfied_wins_over_cancel() {
        let clock = Arc::new(FakeClock::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let state = waiter(&clock, 50)
            .poll("already", Duration::from_millis(100), &cancel, || async { Ok(true) })
            .await
            .unwrap();
        assert_eq!(state, WaitState::Satisfied);
    }

    #[tokio::test]
    async fn test_zero_timeout_checks_once() {
        let clock = Arc::new(FakeClock::new());
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);

        let state = waiter(&clock, 50)
            .poll("instant", Duration::ZERO, &cancel, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(false) }
            })
            .await
            .unwrap();

        assert_eq!(state, WaitState::TimedOut);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_condition_error_propagates() {
        let clock = Arc::new(FakeClock::new());
        let cancel = CancellationToken::new();

        let err = waiter(&clock, 50)
            .poll("broken", Duration::from_millis(100), &cancel, || async {
                Err(Error::Driver("socket closed".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Driver(_)));
    }

    #[tokio::test]
    async fn test_wait_maps_terminal_states() {
        let clock = Arc::new(FakeClock::new());
        let cancel = CancellationToken::new();

        let err = waiter(&clock, 50)
            .wait("never", Duration::from_millis(60), &cancel, || async { Ok(false) })
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        cancel.cancel();
        let err = waiter(&clock, 50)
            .wait("never", Duration::from_millis(60), &cancel, || async { Ok(false) })
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_real_clock_cancel_is_prompt() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let state = Waiter::new(Arc::new(TokioClock), Duration::from_millis(20))
            .poll("slow", Duration::from_secs(5), &cancel, || async { Ok(false) })
            .await
            .unwrap();

        assert_eq!(state, WaitState::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
