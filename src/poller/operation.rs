use async_trait::async_trait;

use crate::error::BoxError;

/// A check or action that can be attempted repeatedly, such as "the submit
/// button is visible" or "click the menu item".
///
/// Implementations should be idempotent: the poller may call `attempt` many
/// times. Return `Err` while the condition is not met yet.
#[async_trait]
pub trait Operation: Send + Sync {
    type Output: Send;

    async fn attempt(&self) -> Result<Self::Output, BoxError>;
}
