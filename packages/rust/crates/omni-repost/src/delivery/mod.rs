//! Plan execution with bounded per-step retries.

mod channel;
mod error;
mod executor;
mod sleeper;

pub use channel::DeliveryChannel;
pub use error::{DeliveryError, ExecutionError};
pub use executor::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TRANSIENT_COOLDOWN_SECS, DeliveryExecutor, DeliveryReport,
    RetryPolicy, RetryState,
};
pub use sleeper::{Sleeper, TokioSleeper};
