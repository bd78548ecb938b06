use async_trait::async_trait;

use crate::compose::SendStep;

use super::error::DeliveryError;

/// Destination that can perform one send step at a time.
///
/// Implementations make a single attempt per call; retries and backoff are
/// owned by [`super::DeliveryExecutor`].
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    async fn send_step(&self, step: &SendStep) -> Result<(), DeliveryError>;
}
