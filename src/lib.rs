//! # Retry Poller
//!
//! An asynchronous retry-until-success primitive for UI and mobile test
//! automation: wait for an element to appear, retry a click until the page
//! accepts it, or poll element state until it settles.
//!
//! ## Features
//!
//! - One polling loop shared by every `wait_for*` style call site
//! - Time budget, fixed interval and optional attempt cap per policy
//! - Retryable vs fatal error classification
//! - Cooperative cancellation through a `CancellationToken`
//! - Retry hooks for caller-side logging
//! - Named policy profiles loaded from JSON
//!
//! ## Usage
//!
//! Add the following to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! retry-poller = "0.1"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use retry_poller::{BoxError, Operation, Poller, RetryPolicy};
//! use async_trait::async_trait;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! // A check against some page element
//! struct SubmitButtonVisible {
//!     renders: AtomicU32,
//! }
//!
//! #[async_trait]
//! impl Operation for SubmitButtonVisible {
//!     type Output = ();
//!
//!     async fn attempt(&self) -> Result<(), BoxError> {
//!         if self.renders.fetch_add(1, Ordering::SeqCst) < 2 {
//!             Err("button not rendered yet".into())
//!         } else {
//!             Ok(())
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let policy = RetryPolicy::builder()
//!         .timeout_ms(2000)
//!         .interval_ms(10)
//!         .build()
//!         .unwrap();
//!
//!     let check = SubmitButtonVisible { renders: AtomicU32::new(0) };
//!     let polled = Poller::new(policy)
//!         .describe("submit button")
//!         .run_operation(&check)
//!         .await;
//!
//!     match polled {
//!         Ok(p) => println!("visible after {} attempts", p.attempts),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```
//!
//! ## License
//!
//! Licensed under the MIT license. See the [LICENSE](LICENSE) file for details.

pub mod error;
pub mod policy;
pub mod poller;
pub mod wait;

pub use error::{BoxError, PolicyError, PollError};
pub use policy::{
    ErrorClass, ErrorClassifier, Fatal, PolicyConfig, PollerConfig, RetryPolicy,
    RetryPolicyBuilder,
};
pub use poller::{poll, AttemptOutcome, Operation, Polled, Poller, RetryEvent, RetryHook};
pub use tokio_util::sync::CancellationToken;
pub use wait::{delay, wait_for, wait_until, NotReady};
