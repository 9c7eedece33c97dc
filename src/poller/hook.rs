use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

/// A retryable failure, reported just before the poller waits to retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryEvent<'a> {
    /// What the poll is waiting for.
    pub target: &'a str,
    /// 1-based number of the attempt that just failed.
    pub attempt: u32,
    /// Time since the first attempt started.
    pub elapsed: Duration,
    pub error: &'a (dyn Error + Send + Sync + 'static),
    /// Pause before the next attempt.
    pub next_delay: Duration,
}

/// Callback observing retryable failures.
pub type RetryHook = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;

/// Hook that logs each retry at debug level.
pub fn log_retries() -> RetryHook {
    Arc::new(|event: &RetryEvent<'_>| {
        debug!(
            "Still waiting for {} (attempt {}, {:?} elapsed): {}; retrying in {:?}",
            event.target, event.attempt, event.elapsed, event.error, event.next_delay
        );
    })
}
