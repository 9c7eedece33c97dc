use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;

/// Whether a failed attempt should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The condition is not met yet; try again.
    Retryable,
    /// A genuine defect; stop polling and surface the error.
    Fatal,
}

type Predicate = dyn Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync;

/// Decides whether an error raised by an attempt is retryable.
///
/// Errors wrapped in [`Fatal`] are always fatal, whatever the predicate says.
#[derive(Clone)]
pub struct ErrorClassifier {
    is_retryable: Arc<Predicate>,
}

impl ErrorClassifier {
    /// Classifier built from a predicate returning `true` for retryable errors.
    pub fn new<F>(is_retryable: F) -> Self
    where
        F: Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync + 'static,
    {
        Self {
            is_retryable: Arc::new(is_retryable),
        }
    }

    /// Retries every error. This is the default.
    pub fn retry_all() -> Self {
        Self::new(|_| true)
    }

    /// Treats errors of type `E` as fatal, found either at the top level or
    /// anywhere in the `source()` chain. Everything else is retried.
    pub fn fatal_on<E>() -> Self
    where
        E: Error + 'static,
    {
        Self::new(|err| !chain_contains::<E>(err))
    }

    pub fn classify(&self, err: &(dyn Error + Send + Sync + 'static)) -> ErrorClass {
        if err.is::<Fatal>() || !(self.is_retryable)(err) {
            ErrorClass::Fatal
        } else {
            ErrorClass::Retryable
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::retry_all()
    }
}

impl fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorClassifier(<predicate>)")
    }
}

fn chain_contains<E: Error + 'static>(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<E>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Marks an error as non-retryable.
///
/// Operations return `Err(Fatal::new(e).into())` to stop a poll immediately.
/// The poller unwraps the marker, so callers see the original error.
#[derive(Debug)]
pub struct Fatal(BoxError);

impl Fatal {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Fatal(err.into())
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for Fatal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// Strips a [`Fatal`] marker, returning the wrapped error.
pub(crate) fn unwrap_fatal(err: BoxError) -> BoxError {
    match err.downcast::<Fatal>() {
        Ok(fatal) => fatal.into_inner(),
        Err(err) => err,
    }
}
