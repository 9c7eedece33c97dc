use crate::error::BoxError;
use crate::policy::{classifier, ErrorClass, RetryPolicy};

/// Result of a single attempt, classified against the active policy.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Success(T),
    RetryableFailure(BoxError),
    FatalFailure(BoxError),
}

impl<T> AttemptOutcome<T> {
    /// Classifies the raw result of an attempt.
    ///
    /// Fatal errors lose their [`Fatal`](crate::Fatal) marker here, so the
    /// caller sees the error the operation originally raised.
    pub fn classify(result: Result<T, BoxError>, policy: &RetryPolicy) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) => match policy.classify(&*err) {
                ErrorClass::Retryable => AttemptOutcome::RetryableFailure(err),
                ErrorClass::Fatal => AttemptOutcome::FatalFailure(classifier::unwrap_fatal(err)),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}
