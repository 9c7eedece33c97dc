//! Helpers for element-interaction call sites built on [`poll`](crate::poll).

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, PollError};
use crate::policy::RetryPolicy;
use crate::poller::Poller;

/// Retryable error raised while a checked condition is still false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotReady;

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "condition not met yet")
    }
}

impl std::error::Error for NotReady {}

/// Pauses for a fixed duration. Not a poll: nothing is checked or retried.
pub async fn delay(duration: Duration) {
    sleep(duration).await;
}

/// Pauses for a fixed duration unless `token` fires first.
///
/// Returns `true` if the full duration elapsed.
pub async fn delay_or_cancel(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        _ = sleep(duration) => true,
        _ = token.cancelled() => false,
    }
}

/// Polls a boolean check such as `is_visible` until it returns `true`.
///
/// `Ok(false)` counts as a retryable [`NotReady`] failure; errors from the
/// check go through the policy's classifier.
pub async fn wait_until<F, Fut, E>(check: F, policy: &RetryPolicy) -> Result<(), PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Into<BoxError>,
{
    wait_until_with(&Poller::new(policy.clone()), check).await
}

/// Like [`wait_until`], driven by a configured [`Poller`].
pub async fn wait_until_with<F, Fut, E>(poller: &Poller, mut check: F) -> Result<(), PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Into<BoxError>,
{
    poller
        .run(|| {
            let fut = check();
            async move {
                match fut.await {
                    Ok(true) => Ok(()),
                    Ok(false) => Err(BoxError::from(NotReady)),
                    Err(err) => Err(err.into()),
                }
            }
        })
        .await
        .map(|_| ())
}

/// Polls a probe until it yields a value, e.g. reading an element's text
/// once it is non-empty.
///
/// `Ok(None)` counts as a retryable [`NotReady`] failure.
pub async fn wait_for<F, Fut, T, E>(probe: F, policy: &RetryPolicy) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Into<BoxError>,
{
    wait_for_with(&Poller::new(policy.clone()), probe).await
}

/// Like [`wait_for`], driven by a configured [`Poller`].
pub async fn wait_for_with<F, Fut, T, E>(poller: &Poller, mut probe: F) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Into<BoxError>,
{
    poller
        .run(|| {
            let fut = probe();
            async move {
                match fut.await {
                    Ok(Some(value)) => Ok(value),
                    Ok(None) => Err(BoxError::from(NotReady)),
                    Err(err) => Err(err.into()),
                }
            }
        })
        .await
        .map(|polled| polled.value)
}
