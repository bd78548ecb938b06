//! Poll loop: fetch, compose, deliver, checkpoint, sleep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::checkpoint::{CheckpointError, FileCheckpoint};
use crate::compose::PostComposer;
use crate::config::PartialFailurePolicy;
use crate::delivery::{DeliveryChannel, DeliveryExecutor};
use crate::source::PostSource;

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Fresh posts offered by the source.
    pub fetched: usize,
    /// Posts whose whole plan was delivered.
    pub delivered: usize,
    /// Post that stopped the batch, if any.
    pub failed_post: Option<i64>,
    /// Checkpoint value after the cycle.
    pub checkpoint: i64,
}

/// Why [`PollRunner::run_until`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { cycles: u64 },
    Interrupted { cycles: u64 },
}

pub struct PollRunner {
    source: Arc<dyn PostSource>,
    channel: Arc<dyn DeliveryChannel>,
    composer: PostComposer,
    executor: DeliveryExecutor,
    checkpoint: FileCheckpoint,
    partial_failure: PartialFailurePolicy,
}

impl PollRunner {
    pub fn new(
        source: Arc<dyn PostSource>,
        channel: Arc<dyn DeliveryChannel>,
        composer: PostComposer,
        executor: DeliveryExecutor,
        checkpoint: FileCheckpoint,
    ) -> Self {
        Self {
            source,
            channel,
            composer,
            executor,
            checkpoint,
            partial_failure: PartialFailurePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_partial_failure(mut self, policy: PartialFailurePolicy) -> Self {
        self.partial_failure = policy;
        self
    }

    /// One full cycle. Errors only when the checkpoint cannot be read or
    /// written, or the source cannot be fetched.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let last_delivered_id = self
            .checkpoint
            .load()
            .await
            .context("failed to load checkpoint")?;
        let result = self.deliver_since(last_delivered_id).await;

        if let Err(error) = self.source.end_cycle().await {
            tracing::warn!(source = self.source.name(), error = %error, "source cleanup failed");
        }
        if let Err(error) = self.checkpoint.touch_last_check().await {
            tracing::warn!(error = %error, "failed to record last check time");
        }
        result
    }

    async fn deliver_since(&self, last_delivered_id: i64) -> Result<CycleReport> {
        let mut posts = self
            .source
            .fetch_since(last_delivered_id)
            .await
            .with_context(|| format!("failed to fetch posts from {}", self.source.name()))?;
        posts.retain(|post| post.id > last_delivered_id);
        posts.sort_by_key(|post| post.id);

        let mut report = CycleReport {
            fetched: posts.len(),
            checkpoint: last_delivered_id,
            ..CycleReport::default()
        };

        for post in &posts {
            let plan = self.composer.compose(post);
            if plan.is_empty() {
                tracing::info!(post_id = post.id, "post has nothing to deliver; skipping");
                self.advance(&mut report, post.id).await?;
                continue;
            }

            tracing::info!(post_id = post.id, steps = plan.len(), "delivering post");
            match self.executor.execute(&plan, self.channel.as_ref()).await {
                Ok(delivery) => {
                    tracing::info!(
                        post_id = post.id,
                        steps = delivery.delivered_steps,
                        retried_attempts = delivery.retried_attempts,
                        "post delivered"
                    );
                    self.advance(&mut report, post.id).await?;
                    report.delivered += 1;
                }
                Err(error) => {
                    tracing::error!(
                        post_id = post.id,
                        delivered_steps = error.delivered_steps(),
                        error = %error,
                        "post delivery failed; stopping batch"
                    );
                    if self.partial_failure == PartialFailurePolicy::Advance
                        && error.delivered_steps() > 0
                    {
                        tracing::warn!(
                            post_id = post.id,
                            "partially delivered post will not be retried"
                        );
                        self.advance(&mut report, post.id).await?;
                    }
                    report.failed_post = Some(post.id);
                    break;
                }
            }
        }

        Ok(report)
    }

    async fn advance(&self, report: &mut CycleReport, post_id: i64) -> Result<()> {
        self.checkpoint
            .store(post_id)
            .await
            .context("failed to store checkpoint")?;
        report.checkpoint = post_id;
        Ok(())
    }

    /// Cycle, then sleep `interval`, until `shutdown` resolves or, with
    /// `single_start`, after the first cycle.
    ///
    /// Checkpoint errors end the loop; fetch errors are logged and retried
    /// next cycle.
    pub async fn run_until<F>(
        &self,
        interval: Duration,
        single_start: bool,
        shutdown: F,
    ) -> Result<RunOutcome>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0_u64;

        loop {
            match self.run_cycle().await {
                Ok(report) => tracing::info!(
                    fetched = report.fetched,
                    delivered = report.delivered,
                    failed_post = ?report.failed_post,
                    checkpoint = report.checkpoint,
                    "poll cycle finished"
                ),
                Err(error) if is_checkpoint_error(&error) => return Err(error),
                Err(error) => tracing::warn!(error = format!("{error:#}"), "poll cycle failed"),
            }
            cycles += 1;

            if single_start {
                return Ok(RunOutcome::Completed { cycles });
            }

            tracing::info!(interval_secs = interval.as_secs(), "sleeping until next poll");
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = &mut shutdown => {
                    tracing::info!(cycles, "received shutdown; stopping poll loop");
                    return Ok(RunOutcome::Interrupted { cycles });
                }
            }
        }
    }

    /// [`Self::run_until`] stopped by Ctrl+C.
    pub async fn run_forever(&self, interval: Duration, single_start: bool) -> Result<RunOutcome> {
        self.run_until(interval, single_start, async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %error, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

fn is_checkpoint_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .any(|cause| cause.downcast_ref::<CheckpointError>().is_some())
}
