use std::time::Duration;

/// Failure of a single send step, classified by how it may be retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The platform asked us to back off for `retry_after`.
    #[error("rate limited, retry after {}s: {detail}", retry_after.as_secs())]
    RateLimited {
        retry_after: Duration,
        detail: String,
    },
    /// Bad request, timeout, server or transport error; retried after a cooldown.
    #[error("transient request error: {0}")]
    Transient(String),
    /// Not worth retrying.
    #[error("permanent request error: {0}")]
    Permanent(String),
}

impl DeliveryError {
    pub fn rate_limited(retry_after: Duration, detail: impl Into<String>) -> Self {
        Self::RateLimited {
            retry_after,
            detail: detail.into(),
        }
    }

    pub fn transient(detail: impl Into<String>) -> Self {
        Self::Transient(detail.into())
    }

    pub fn permanent(detail: impl Into<String>) -> Self {
        Self::Permanent(detail.into())
    }

    /// Rate limits and transient failures; permanent ones never are.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Permanent(_))
    }
}

/// Plan-level failure reported by the executor.
///
/// Steps before `step_index` were delivered and are not rolled back.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    #[error(
        "step {step_index} ({step_kind}) still failing after {attempts} attempts: {last_error}"
    )]
    Exhausted {
        step_index: usize,
        step_kind: &'static str,
        attempts: u32,
        last_error: DeliveryError,
    },
    #[error("step {step_index} ({step_kind}) failed permanently on attempt {attempts}: {last_error}")]
    Permanent {
        step_index: usize,
        step_kind: &'static str,
        attempts: u32,
        last_error: DeliveryError,
    },
}

impl ExecutionError {
    pub fn step_index(&self) -> usize {
        match self {
            Self::Exhausted { step_index, .. } | Self::Permanent { step_index, .. } => *step_index,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Permanent { attempts, .. } => *attempts,
        }
    }

    pub fn last_error(&self) -> &DeliveryError {
        match self {
            Self::Exhausted { last_error, .. } | Self::Permanent { last_error, .. } => last_error,
        }
    }

    /// Number of steps that reached the channel before the failure.
    pub fn delivered_steps(&self) -> usize {
        self.step_index()
    }
}
