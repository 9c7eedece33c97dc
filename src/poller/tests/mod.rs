use super::*;
use crate::policy::Fatal;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

// Mock element whose state flips to ready after a number of checks
struct MockElement {
    checks: AtomicU32,
    ready_after: u32,
    check_delay: Duration,
}

impl MockElement {
    fn new(ready_after: u32) -> Self {
        Self {
            checks: AtomicU32::new(0),
            ready_after,
            check_delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.check_delay = delay;
        self
    }

    fn check_count(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Operation for MockElement {
    type Output = &'static str;

    async fn attempt(&self) -> Result<Self::Output, BoxError> {
        let count = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.check_delay.is_zero() {
            sleep(self.check_delay).await;
        }
        if count > self.ready_after {
            Ok("visible")
        } else {
            Err(format!("element hidden on check {}", count).into())
        }
    }
}

fn policy(timeout_ms: u64, interval_ms: u64) -> RetryPolicy {
    RetryPolicy::from_millis(timeout_ms, interval_ms)
}

#[tokio::test(start_paused = true)]
async fn test_success_on_first_attempt_has_no_delay() {
    let element = MockElement::new(0);
    let polled = Poller::new(policy(1000, 100))
        .run_operation(&element)
        .await
        .unwrap();

    assert_eq!(polled.value, "visible");
    assert_eq!(polled.attempts, 1);
    assert_eq!(polled.elapsed, Duration::ZERO);
    assert_eq!(element.check_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_after_retries_stops_polling() {
    let element = MockElement::new(3);
    let polled = Poller::new(policy(1000, 100))
        .run_operation(&element)
        .await
        .unwrap();

    assert_eq!(polled.attempts, 4);
    assert_eq!(polled.elapsed, Duration::from_millis(300));
    assert_eq!(element.check_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_reports_last_error() {
    let element = MockElement::new(u32::MAX);
    let err = Poller::new(policy(200, 50))
        .describe("#submit to be visible")
        .run_operation(&element)
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.attempts(), 5);
    assert_eq!(err.elapsed(), Duration::from_millis(200));
    assert_eq!(err.target(), "#submit to be visible");
    assert_eq!(
        err.last_error().unwrap().to_string(),
        "element hidden on check 5"
    );
    assert!(err.to_string().starts_with("timed out waiting for #submit to be visible"));
}

#[tokio::test(start_paused = true)]
async fn test_attempt_limit_checked_before_timeout() {
    let element = MockElement::new(u32::MAX);
    let policy = RetryPolicy::builder()
        .timeout_ms(0)
        .interval_ms(0)
        .max_attempts(1)
        .build()
        .unwrap();

    let err = Poller::new(policy).run_operation(&element).await.unwrap_err();

    assert!(err.is_attempt_limit());
    assert_eq!(err.attempts(), 1);
    assert_eq!(element.check_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_makes_single_attempt() {
    let element = MockElement::new(u32::MAX);
    let err = Poller::new(policy(0, 0))
        .run_operation(&element)
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(element.check_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_attempt_is_honored_past_deadline() {
    let element = MockElement::new(0).with_delay(Duration::from_millis(150));
    let polled = Poller::new(policy(100, 10))
        .run_operation(&element)
        .await
        .unwrap();

    assert_eq!(polled.attempts, 1);
    assert_eq!(polled.elapsed, Duration::from_millis(150));
}

#[tokio::test(start_paused = true)]
async fn test_fatal_marker_stops_immediately() {
    let calls = AtomicU32::new(0);
    let err = Poller::new(policy(1000, 100))
        .run(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Fatal::new("stale element reference"))
        })
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.attempts(), 1);
    assert_eq!(err.elapsed(), Duration::ZERO);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // the marker is stripped
    let source = err.into_source().unwrap();
    assert!(!source.is::<Fatal>());
    assert_eq!(source.to_string(), "stale element reference");
}

#[tokio::test(start_paused = true)]
async fn test_retry_hook_sees_every_retryable_failure() {
    let seen: Arc<Mutex<Vec<(u32, Duration)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let element = MockElement::new(2);

    Poller::new(policy(1000, 25))
        .describe("toast message")
        .on_retry(move |event| {
            assert_eq!(event.target, "toast message");
            assert_eq!(event.next_delay, Duration::from_millis(25));
            seen_clone
                .lock()
                .unwrap()
                .push((event.attempt, event.elapsed));
        })
        .run_operation(&element)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![(1, Duration::ZERO), (2, Duration::from_millis(25))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_hook_not_called_on_terminal_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();
    let element = MockElement::new(u32::MAX);
    let policy = RetryPolicy::builder()
        .interval_ms(10)
        .max_attempts(3)
        .build()
        .unwrap();

    let err = Poller::new(policy)
        .on_retry(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .run_operation(&element)
        .await
        .unwrap_err();

    assert!(err.is_attempt_limit());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_first_attempt() {
    let token = CancellationToken::new();
    token.cancel();
    let element = MockElement::new(0);

    let err = Poller::new(policy(1000, 100))
        .with_cancellation(token)
        .run_operation(&element)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.attempts(), 0);
    assert!(err.last_error().is_none());
    assert_eq!(element.check_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_interval() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(250)).await;
        canceller.cancel();
    });

    let element = MockElement::new(u32::MAX);
    let err = Poller::new(policy(10_000, 100))
        .with_cancellation(token)
        .run_operation(&element)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.attempts(), 3);
    assert_eq!(err.elapsed(), Duration::from_millis(250));
    assert_eq!(
        err.last_error().unwrap().to_string(),
        "element hidden on check 3"
    );
}

#[test]
fn test_poll_returns_value() {
    let policy = RetryPolicy::builder().max_attempts(3).build().unwrap();
    let result = tokio_test::block_on(poll(|| async { Ok::<_, BoxError>(42) }, &policy));
    assert_eq!(tokio_test::assert_ok!(result), 42);
}

#[test]
fn test_poll_surfaces_exhaustion() {
    let policy = RetryPolicy::builder().max_attempts(2).interval_ms(1).build().unwrap();
    let result = tokio_test::block_on(poll(|| async { Err::<(), _>("never ready") }, &policy));
    let err = tokio_test::assert_err!(result);
    assert!(err.is_attempt_limit());
}

#[test]
fn test_poller_debug_hides_hook() {
    let poller = Poller::new(RetryPolicy::default()).on_retry(|_| {});
    let rendered = format!("{:?}", poller);
    assert!(rendered.contains("<hook>"));
    assert!(rendered.contains("condition"));
}
