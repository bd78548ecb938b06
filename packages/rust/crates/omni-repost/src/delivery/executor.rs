use std::sync::Arc;
use std::time::Duration;

use crate::compose::{Plan, SendStep};

use super::channel::DeliveryChannel;
use super::error::{DeliveryError, ExecutionError};
use super::sleeper::{Sleeper, TokioSleeper};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TRANSIENT_COOLDOWN_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per step, including the first one.
    pub max_attempts: u32,
    /// Wait before retrying a transient failure.
    pub transient_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            transient_cooldown: Duration::from_secs(DEFAULT_TRANSIENT_COOLDOWN_SECS),
        }
    }
}

/// Attempt bookkeeping for a single step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    pub attempt_count: u32,
    pub last_error: Option<DeliveryError>,
}

/// Successful plan execution summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered_steps: usize,
    /// Attempts beyond the first, summed over all steps.
    pub retried_attempts: u32,
}

/// Runs a [`Plan`] step by step against a [`DeliveryChannel`].
pub struct DeliveryExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl DeliveryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute every step in order. The first step that cannot be delivered
    /// aborts the rest of the plan.
    pub async fn execute(
        &self,
        plan: &Plan,
        channel: &dyn DeliveryChannel,
    ) -> Result<DeliveryReport, ExecutionError> {
        let mut retried_attempts = 0;
        for (step_index, entry) in plan.entries().iter().enumerate() {
            let state = self.run_step(step_index, &entry.step, channel).await?;
            retried_attempts += state.attempt_count.saturating_sub(1);
            if let Some(pause) = entry.pause_after {
                self.sleeper.sleep(pause).await;
            }
        }

        Ok(DeliveryReport {
            delivered_steps: plan.len(),
            retried_attempts,
        })
    }

    async fn run_step(
        &self,
        step_index: usize,
        step: &SendStep,
        channel: &dyn DeliveryChannel,
    ) -> Result<RetryState, ExecutionError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = RetryState::default();

        loop {
            state.attempt_count += 1;
            let error = match channel.send_step(step).await {
                Ok(()) => {
                    tracing::debug!(
                        channel = channel.name(),
                        step = step.kind(),
                        step_index,
                        attempt = state.attempt_count,
                        "delivered step"
                    );
                    return Ok(state);
                }
                Err(error) => error,
            };

            if !error.is_recoverable() {
                tracing::error!(
                    channel = channel.name(),
                    step = step.kind(),
                    step_index,
                    attempt = state.attempt_count,
                    error = %error,
                    "step failed permanently; aborting plan"
                );
                return Err(ExecutionError::Permanent {
                    step_index,
                    step_kind: step.kind(),
                    attempts: state.attempt_count,
                    last_error: error,
                });
            }
            let delay = match &error {
                DeliveryError::RateLimited { retry_after, .. } => *retry_after,
                DeliveryError::Transient(_) | DeliveryError::Permanent(_) => {
                    self.policy.transient_cooldown
                }
            };

            if state.attempt_count >= max_attempts {
                tracing::error!(
                    channel = channel.name(),
                    step = step.kind(),
                    step_index,
                    attempt = state.attempt_count,
                    error = %error,
                    "step retries exhausted; aborting plan"
                );
                return Err(ExecutionError::Exhausted {
                    step_index,
                    step_kind: step.kind(),
                    attempts: state.attempt_count,
                    last_error: error,
                });
            }

            tracing::warn!(
                channel = channel.name(),
                step = step.kind(),
                step_index,
                attempt = state.attempt_count,
                max_attempts,
                delay_ms = delay.as_millis(),
                error = %error,
                "step delivery failed; retrying"
            );
            state.last_error = Some(error);
            self.sleeper.sleep(delay).await;
        }
    }
}
