//! Retry budget, sleeping and cancellation for the readiness loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, StackError};

/// Probes attempted before giving up on Kibana
pub const DEFAULT_MAX_ATTEMPTS: u32 = 15;
/// Pause between two probes
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(40);

/// Upper bound accepted for the delay between probes
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest uninterrupted sleep; bounds how late a cancellation is noticed.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// Bounded, fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryBudget {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// Cooperative cancellation token backed by an `AtomicBool`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancel this token on Ctrl+C. Only one handler may exist per process.
    pub fn install_ctrlc_handler(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || token.cancel())
            .map_err(|e| StackError::SignalHandler(e.to_string()))
    }
}

/// Blocking pause between readiness probes
pub trait Sleeper {
    fn sleep(&self, delay: Duration);
}

impl<T: Sleeper + ?Sized> Sleeper for &T {
    fn sleep(&self, delay: Duration) {
        (**self).sleep(delay)
    }
}

/// Sleeps on the current thread, waking early once the token is cancelled
#[derive(Debug, Clone, Default)]
pub struct ThreadSleeper {
    cancel: CancelToken,
}

impl ThreadSleeper {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        let now = Instant::now();
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + MAX_RETRY_DELAY);
        while !self.cancel.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let budget = RetryBudget::default();
        assert_eq!(budget.max_attempts, 15);
        assert_eq!(budget.delay, Duration::from_secs(40));
    }

    #[test]
    fn test_cancel_token_visible_across_clones() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn test_thread_sleeper_waits() {
        let sleeper = ThreadSleeper::new(CancelToken::new());
        let start = Instant::now();
        sleeper.sleep(Duration::from_millis(30));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_thread_sleeper_survives_overflowing_delay() {
        let token = CancelToken::new();
        token.cancel();
        let sleeper = ThreadSleeper::new(token);
        let start = Instant::now();
        sleeper.sleep(Duration::from_secs(u64::MAX));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_second_ctrlc_handler_is_a_signal_error() {
        let token = CancelToken::new();
        let _ = token.install_ctrlc_handler();
        let err = token.install_ctrlc_handler().unwrap_err();
        assert!(matches!(err, StackError::SignalHandler(_)));
    }

    #[test]
    fn test_thread_sleeper_returns_early_when_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let sleeper = ThreadSleeper::new(token);
        let start = Instant::now();
        sleeper.sleep(Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
