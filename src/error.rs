use std::error::Error;
use std::time::Duration;

use thiserror::Error;

/// Error type returned by polled operations.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Terminal failure of a poll.
///
/// Every variant records what was being waited for, how many attempts were
/// made and how long the poll ran, so a failed wait reads as one line
/// instead of a stack of repeated driver errors.
#[derive(Debug, Error)]
pub enum PollError {
    /// The time budget ran out before any attempt succeeded.
    #[error("timed out waiting for {target} after {elapsed:?} ({attempts} attempts): {last_error}")]
    Timeout {
        target: String,
        attempts: u32,
        elapsed: Duration,
        last_error: BoxError,
    },

    /// The attempt cap was reached before any attempt succeeded.
    #[error("gave up waiting for {target} after {attempts} attempts in {elapsed:?}: {last_error}")]
    AttemptLimit {
        target: String,
        attempts: u32,
        elapsed: Duration,
        last_error: BoxError,
    },

    /// The classifier judged an error non-retryable.
    #[error("fatal error while waiting for {target} on attempt {attempts}: {source}")]
    Fatal {
        target: String,
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: BoxError,
    },

    /// The poll was aborted through its cancellation token.
    #[error("cancelled waiting for {target} after {elapsed:?} ({attempts} attempts)")]
    Cancelled {
        target: String,
        attempts: u32,
        elapsed: Duration,
        last_error: Option<BoxError>,
    },
}

impl PollError {
    /// Number of attempts made before the poll terminated.
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Timeout { attempts, .. }
            | PollError::AttemptLimit { attempts, .. }
            | PollError::Fatal { attempts, .. }
            | PollError::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// Time from the first attempt to termination.
    pub fn elapsed(&self) -> Duration {
        match self {
            PollError::Timeout { elapsed, .. }
            | PollError::AttemptLimit { elapsed, .. }
            | PollError::Fatal { elapsed, .. }
            | PollError::Cancelled { elapsed, .. } => *elapsed,
        }
    }

    /// Description of what the poll was waiting for.
    pub fn target(&self) -> &str {
        match self {
            PollError::Timeout { target, .. }
            | PollError::AttemptLimit { target, .. }
            | PollError::Fatal { target, .. }
            | PollError::Cancelled { target, .. } => target,
        }
    }

    /// The most recent underlying error, if any attempt failed.
    ///
    /// For [`PollError::Fatal`] this is the error that stopped the poll.
    pub fn last_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            PollError::Timeout { last_error, .. } | PollError::AttemptLimit { last_error, .. } => {
                Some(&**last_error)
            }
            PollError::Fatal { source, .. } => Some(&**source),
            PollError::Cancelled { last_error, .. } => last_error.as_deref(),
        }
    }

    /// Consumes the error and returns the underlying cause.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            PollError::Timeout { last_error, .. } | PollError::AttemptLimit { last_error, .. } => {
                Some(last_error)
            }
            PollError::Fatal { source, .. } => Some(source),
            PollError::Cancelled { last_error, .. } => last_error,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout { .. })
    }

    pub fn is_attempt_limit(&self) -> bool {
        matches!(self, PollError::AttemptLimit { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, PollError::Fatal { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PollError::Cancelled { .. })
    }
}

/// Errors raised while building or loading a [`RetryPolicy`](crate::RetryPolicy).
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("invalid poller config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read poller config: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown policy profile: {0}")]
    UnknownProfile(String),
}
