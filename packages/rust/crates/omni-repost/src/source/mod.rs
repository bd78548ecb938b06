//! Where posts come from.

pub mod vk;

use async_trait::async_trait;

use crate::post::Post;

/// Supplies normalized posts newer than the last delivered one.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Human-readable source name.
    fn name(&self) -> &str;

    /// Posts with an id greater than `last_delivered_id`, oldest first.
    async fn fetch_since(&self, last_delivered_id: i64) -> anyhow::Result<Vec<Post>>;

    /// Called once after every poll cycle, whatever its outcome.
    async fn end_cycle(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
