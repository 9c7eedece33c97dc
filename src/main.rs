use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use retry_poller::poller::log_retries;
use retry_poller::{BoxError, Poller, PollerConfig};

/// Simulated page element that becomes visible after a few renders.
struct ExampleElement {
    selector: String,
    renders: AtomicU32,
    visible_after: u32,
}

impl ExampleElement {
    async fn is_visible(&self) -> Result<bool, BoxError> {
        // Simulate a driver round trip.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let render = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(render > self.visible_after)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();
    println!("Starting the retry poller demo...");

    // Step 1: Load policy profiles, falling back to built-in defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => PollerConfig::from_path(path)?,
        None => PollerConfig::default(),
    };
    let profile = std::env::args().nth(2);
    let policy = config.policy(profile.as_deref())?;
    println!(
        "Using policy: timeout {:?}, interval {:?}, max attempts {:?}",
        policy.timeout(),
        policy.interval(),
        policy.max_attempts()
    );

    // Step 2: Wait for the simulated element.
    let element = ExampleElement {
        selector: "#checkout".into(),
        renders: AtomicU32::new(0),
        visible_after: 3,
    };
    let poller = Poller::new(policy)
        .describe(format!("{} to be visible", element.selector))
        .with_retry_hook(log_retries());

    let polled = poller
        .run(|| async {
            match element.is_visible().await {
                Ok(true) => Ok(()),
                Ok(false) => Err(BoxError::from(format!("{} is hidden", element.selector))),
                Err(e) => Err(e),
            }
        })
        .await?;

    println!(
        "{} became visible after {} attempt(s) in {:?}",
        element.selector, polled.attempts, polled.elapsed
    );

    Ok(())
}
