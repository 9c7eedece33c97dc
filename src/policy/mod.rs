use std::error::Error;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::PolicyError;

pub mod classifier;
pub mod config;


pub use classifier::{ErrorClass, ErrorClassifier, Fatal};
pub use config::{PolicyConfig, PollerConfig};

/// Default total time budget of a poll.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Timing and classification rules for one poll.
///
/// A policy is never mutated by polling, so one value can be shared by any
/// number of concurrent polls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    timeout: Duration,
    interval: Duration,
    max_attempts: Option<NonZeroU32>,
    classifier: ErrorClassifier,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            max_attempts: None,
            classifier: ErrorClassifier::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            ..Self::default()
        }
    }

    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts.map(NonZeroU32::get)
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    pub fn with_timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn with_interval(mut self, value: Duration) -> Self {
        self.interval = value;
        self
    }

    pub fn with_max_attempts(mut self, value: NonZeroU32) -> Self {
        self.max_attempts = Some(value);
        self
    }

    pub fn with_classifier(mut self, value: ErrorClassifier) -> Self {
        self.classifier = value;
        self
    }

    /// Classifies an error raised by an attempt.
    pub fn classify(&self, err: &(dyn Error + Send + Sync + 'static)) -> ErrorClass {
        self.classifier.classify(err)
    }

    /// Whether `attempts` has reached the attempt cap.
    pub(crate) fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts
            .map_or(false, |max| attempts >= max.get())
    }

    /// Whether `elapsed` has used up the time budget.
    pub(crate) fn time_exhausted(&self, elapsed: Duration) -> bool {
        elapsed >= self.timeout
    }
}

/// Builds a [`RetryPolicy`] from named fields, validating the attempt cap.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicyBuilder {
    timeout: Option<Duration>,
    interval: Option<Duration>,
    max_attempts: Option<u32>,
    classifier: Option<ErrorClassifier>,
}

impl RetryPolicyBuilder {
    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = Some(value);
        self
    }

    pub fn timeout_ms(self, value: u64) -> Self {
        self.timeout(Duration::from_millis(value))
    }

    pub fn interval(mut self, value: Duration) -> Self {
        self.interval = Some(value);
        self
    }

    pub fn interval_ms(self, value: u64) -> Self {
        self.interval(Duration::from_millis(value))
    }

    pub fn max_attempts(mut self, value: u32) -> Self {
        self.max_attempts = Some(value);
        self
    }

    pub fn classifier(mut self, value: ErrorClassifier) -> Self {
        self.classifier = Some(value);
        self
    }

    /// Treats errors of type `E` as fatal and retries everything else.
    pub fn fatal_on<E: Error + 'static>(self) -> Self {
        self.classifier(ErrorClassifier::fatal_on::<E>())
    }

    pub fn build(self) -> Result<RetryPolicy, PolicyError> {
        let max_attempts = match self.max_attempts {
            Some(n) => Some(NonZeroU32::new(n).ok_or(PolicyError::ZeroMaxAttempts)?),
            None => None,
        };

        Ok(RetryPolicy {
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            max_attempts,
            classifier: self.classifier.unwrap_or_default(),
        })
    }
}
