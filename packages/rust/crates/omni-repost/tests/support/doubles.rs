use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use omni_repost::{DeliveryChannel, DeliveryError, MetadataProbe, ProbeError, SendStep, Sleeper};

/// Records requested sleeps and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Channel whose answers are scripted per attempt; unscripted attempts succeed.
#[derive(Default)]
pub struct ScriptedChannel {
    outcomes: Mutex<VecDeque<Result<(), DeliveryError>>>,
    attempts: Mutex<Vec<SendStep>>,
}

impl ScriptedChannel {
    pub fn new(outcomes: impl IntoIterator<Item = Result<(), DeliveryError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Every step passed to `send_step`, including failed attempts.
    pub fn attempts(&self) -> Vec<SendStep> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryChannel for ScriptedChannel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send_step(&self, step: &SendStep) -> Result<(), DeliveryError> {
        self.attempts.lock().unwrap().push(step.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Probe answering from a fixed `url -> size` table; unknown URLs fail.
#[derive(Default)]
pub struct StaticProbe {
    sizes: HashMap<String, u64>,
    probed: Mutex<Vec<String>>,
}

impl StaticProbe {
    pub fn new<'a>(sizes: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self {
            sizes: sizes
                .into_iter()
                .map(|(url, size)| (url.to_string(), size))
                .collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProbe for StaticProbe {
    async fn byte_size(&self, url: &str) -> Result<u64, ProbeError> {
        self.probed.lock().unwrap().push(url.to_string());
        self.sizes
            .get(url)
            .copied()
            .ok_or(ProbeError::Status(reqwest::StatusCode::NOT_FOUND))
    }
}
