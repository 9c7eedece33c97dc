use std::future::Future;
use std::time::Duration;

use log::{debug, trace};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, PollError};
use crate::policy::RetryPolicy;

pub mod hook;
mod operation;
mod outcome;

#[cfg(test)]
mod tests;

pub use hook::{log_retries, RetryEvent, RetryHook};
pub use operation::Operation;
pub use outcome::AttemptOutcome;

const DEFAULT_TARGET: &str = "condition";

/// Successful result of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled<T> {
    pub value: T,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub elapsed: Duration,
}

impl<T> Polled<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Retries an operation until it succeeds, fails fatally, or exhausts the
/// budget of its [`RetryPolicy`].
///
/// Each call to [`Poller::run`] owns its attempt counter, clock and last
/// error, so one `Poller` may drive any number of concurrent polls.
#[derive(Clone)]
pub struct Poller {
    policy: RetryPolicy,
    target: String,
    cancel: Option<CancellationToken>,
    on_retry: Option<RetryHook>,
}

impl Poller {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            target: DEFAULT_TARGET.to_string(),
            cancel: None,
            on_retry: None,
        }
    }

    /// Names what is being waited for; used in errors and hook events.
    pub fn describe(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Aborts the poll with [`PollError::Cancelled`] once `token` fires.
    ///
    /// The token is checked before each attempt and while waiting between
    /// attempts. An attempt already in flight is never interrupted.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_retry_hook(mut self, hook: RetryHook) -> Self {
        self.on_retry = Some(hook);
        self
    }

    pub fn on_retry<F>(self, hook: F) -> Self
    where
        F: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.with_retry_hook(std::sync::Arc::new(hook))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Polls `operation` until it returns `Ok`.
    ///
    /// The time budget is checked only after an attempt completes: an
    /// attempt still running at the deadline is awaited and its result
    /// honored.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<Polled<T>, PollError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        let started = Instant::now();
        let mut attempts = 0u32;
        let mut last_error: Option<BoxError> = None;

        trace!(
            "Waiting for {} (timeout {:?}, interval {:?}, max attempts {:?})",
            self.target,
            self.policy.timeout(),
            self.policy.interval(),
            self.policy.max_attempts()
        );

        loop {
            if self.is_cancelled() {
                return Err(self.cancelled(attempts, started.elapsed(), last_error));
            }

            attempts += 1;
            let result = operation().await.map_err(Into::into);
            let elapsed = started.elapsed();

            match AttemptOutcome::classify(result, &self.policy) {
                AttemptOutcome::Success(value) => {
                    debug!(
                        "{} reached after {} attempt(s) in {:?}",
                        self.target, attempts, elapsed
                    );
                    return Ok(Polled {
                        value,
                        attempts,
                        elapsed,
                    });
                }
                AttemptOutcome::FatalFailure(source) => {
                    debug!(
                        "Fatal error waiting for {} on attempt {}: {}",
                        self.target, attempts, source
                    );
                    return Err(PollError::Fatal {
                        target: self.target.clone(),
                        attempts,
                        elapsed,
                        source,
                    });
                }
                AttemptOutcome::RetryableFailure(err) => {
                    if self.policy.attempts_exhausted(attempts) {
                        debug!("Gave up on {} after {} attempt(s)", self.target, attempts);
                        return Err(PollError::AttemptLimit {
                            target: self.target.clone(),
                            attempts,
                            elapsed,
                            last_error: err,
                        });
                    }
                    if self.policy.time_exhausted(elapsed) {
                        debug!("Timed out on {} after {:?}", self.target, elapsed);
                        return Err(PollError::Timeout {
                            target: self.target.clone(),
                            attempts,
                            elapsed,
                            last_error: err,
                        });
                    }

                    if let Some(hook) = &self.on_retry {
                        hook(&RetryEvent {
                            target: &self.target,
                            attempt: attempts,
                            elapsed,
                            error: &*err,
                            next_delay: self.policy.interval(),
                        });
                    }
                    last_error = Some(err);
                }
            }

            if !self.pause().await {
                return Err(self.cancelled(attempts, started.elapsed(), last_error));
            }
        }
    }

    /// Polls an [`Operation`] implementation.
    pub async fn run_operation<O>(&self, operation: &O) -> Result<Polled<O::Output>, PollError>
    where
        O: Operation + ?Sized,
    {
        self.run(|| operation.attempt()).await
    }

    /// Waits out the interval. Returns `false` if cancelled meanwhile.
    async fn pause(&self) -> bool {
        let interval = self.policy.interval();
        if interval.is_zero() {
            // Back-to-back attempts still hand control back to the runtime.
            tokio::task::yield_now().await;
            return !self.is_cancelled();
        }

        match &self.cancel {
            Some(token) => tokio::select! {
                _ = sleep(interval) => true,
                _ = token.cancelled() => false,
            },
            None => {
                sleep(interval).await;
                true
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, CancellationToken::is_cancelled)
    }

    fn cancelled(
        &self,
        attempts: u32,
        elapsed: Duration,
        last_error: Option<BoxError>,
    ) -> PollError {
        debug!("Stopped waiting for {}: cancelled", self.target);
        PollError::Cancelled {
            target: self.target.clone(),
            attempts,
            elapsed,
            last_error,
        }
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("policy", &self.policy)
            .field("target", &self.target)
            .field("cancellable", &self.cancel.is_some())
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// Polls `operation` under `policy` and returns its first successful value.
///
/// ```
/// use retry_poller::{poll, RetryPolicy};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// # #[tokio::main]
/// # async fn main() {
/// let calls = AtomicU32::new(0);
/// let policy = RetryPolicy::from_millis(1000, 10);
///
/// let text = poll(
///     || async {
///         if calls.fetch_add(1, Ordering::SeqCst) < 2 {
///             Err("element not rendered")
///         } else {
///             Ok("Welcome back")
///         }
///     },
///     &policy,
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(text, "Welcome back");
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
pub async fn poll<F, Fut, T, E>(operation: F, policy: &RetryPolicy) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    Poller::new(policy.clone())
        .run(operation)
        .await
        .map(Polled::into_value)
}
