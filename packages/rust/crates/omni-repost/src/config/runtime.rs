//! Resolved runtime configuration: environment over settings over defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::compose::{ComposerConfig, SectionTemplate};
use crate::delivery::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TRANSIENT_COOLDOWN_SECS, RetryPolicy};
use crate::rendition::DEFAULT_VIDEO_SIZE_CEILING_BYTES;
use crate::source::vk::{VK_DEFAULT_API_BASE, VK_DEFAULT_API_VERSION};

use super::settings::{RepostSettings, load_repost_settings};

const DEFAULT_VK_FILTER: &str = "owner";
const DEFAULT_VK_COUNT: u32 = 10;
const DEFAULT_INTERVAL_SECS: u64 = 600;
const DEFAULT_CHUNK_PAUSE_MS: u64 = 500;
const DEFAULT_CHECKPOINT_PATH: &str = "last_id.txt";
const DEFAULT_LAST_CHECK_PATH: &str = "last_check.txt";
const DEFAULT_AUTHORS_PATH: &str = "authors.csv";
const DEFAULT_TEMP_DIR: &str = "temp";

/// What the runner does with the checkpoint when a post's plan fails after
/// some of its steps were already delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialFailurePolicy {
    /// Keep the checkpoint; the whole post is sent again next cycle.
    #[default]
    Redeliver,
    /// Move past the post; its undelivered remainder is dropped.
    Advance,
}

impl FromStr for PartialFailurePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redeliver" => Ok(Self::Redeliver),
            "advance" => Ok(Self::Advance),
            other => Err(format!("unknown partial failure policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RepostConfig {
    pub vk_token: Option<String>,
    pub vk_domain: Option<String>,
    pub vk_api_version: String,
    pub vk_api_base_url: String,
    pub vk_filter: String,
    pub vk_count: u32,
    pub telegram_bot_token: Option<String>,
    pub telegram_channel: Option<String>,
    pub telegram_api_base_url: Option<String>,
    pub interval: Duration,
    pub single_start: bool,
    pub video_size_ceiling_bytes: u64,
    pub retry_policy: RetryPolicy,
    pub chunk_pause: Duration,
    pub partial_failure: PartialFailurePolicy,
    pub section_template: Option<SectionTemplate>,
    pub checkpoint_path: PathBuf,
    pub last_check_path: PathBuf,
    pub authors_path: PathBuf,
    pub temp_dir: PathBuf,
}

impl RepostConfig {
    pub fn from_env() -> Self {
        let settings = load_repost_settings();
        Self::from_lookup(|name| std::env::var(name).ok(), &settings)
    }

    pub fn from_lookup<F>(lookup: F, settings: &RepostSettings) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let runtime = &settings.runtime;
        Self {
            vk_token: resolve_string(&lookup, "VK_TOKEN", settings.vk.token.as_ref()),
            vk_domain: resolve_string(&lookup, "OMNI_REPOST_VK_DOMAIN", settings.vk.domain.as_ref()),
            vk_api_version: resolve_string(
                &lookup,
                "OMNI_REPOST_VK_API_VERSION",
                settings.vk.api_version.as_ref(),
            )
            .unwrap_or_else(|| VK_DEFAULT_API_VERSION.to_string()),
            vk_api_base_url: resolve_string(
                &lookup,
                "OMNI_REPOST_VK_API_BASE_URL",
                settings.vk.api_base_url.as_ref(),
            )
            .unwrap_or_else(|| VK_DEFAULT_API_BASE.to_string()),
            vk_filter: resolve_string(&lookup, "OMNI_REPOST_VK_FILTER", settings.vk.filter.as_ref())
                .unwrap_or_else(|| DEFAULT_VK_FILTER.to_string()),
            vk_count: resolve_positive(
                &lookup,
                "OMNI_REPOST_VK_COUNT",
                settings.vk.count,
                DEFAULT_VK_COUNT,
            ),
            telegram_bot_token: resolve_string(
                &lookup,
                "TELEGRAM_BOT_TOKEN",
                settings.telegram.bot_token.as_ref(),
            ),
            telegram_channel: resolve_string(
                &lookup,
                "OMNI_REPOST_TELEGRAM_CHANNEL",
                settings.telegram.channel.as_ref(),
            ),
            telegram_api_base_url: resolve_string(
                &lookup,
                "OMNI_REPOST_TELEGRAM_API_BASE_URL",
                settings.telegram.api_base_url.as_ref(),
            ),
            interval: Duration::from_secs(resolve_positive(
                &lookup,
                "OMNI_REPOST_INTERVAL_SECS",
                runtime.interval_secs,
                DEFAULT_INTERVAL_SECS,
            )),
            single_start: resolve_bool(
                &lookup,
                "OMNI_REPOST_SINGLE_START",
                runtime.single_start,
                false,
            ),
            video_size_ceiling_bytes: resolve_positive(
                &lookup,
                "OMNI_REPOST_VIDEO_SIZE_CEILING_BYTES",
                runtime.video_size_ceiling_bytes,
                DEFAULT_VIDEO_SIZE_CEILING_BYTES,
            ),
            retry_policy: RetryPolicy {
                max_attempts: resolve_positive(
                    &lookup,
                    "OMNI_REPOST_MAX_ATTEMPTS",
                    runtime.max_attempts,
                    DEFAULT_MAX_ATTEMPTS,
                ),
                transient_cooldown: Duration::from_secs(resolve_positive(
                    &lookup,
                    "OMNI_REPOST_TRANSIENT_COOLDOWN_SECS",
                    runtime.transient_cooldown_secs,
                    DEFAULT_TRANSIENT_COOLDOWN_SECS,
                )),
            },
            chunk_pause: Duration::from_millis(resolve_positive(
                &lookup,
                "OMNI_REPOST_CHUNK_PAUSE_MS",
                runtime.chunk_pause_ms,
                DEFAULT_CHUNK_PAUSE_MS,
            )),
            partial_failure: resolve_partial_failure(&lookup, runtime.partial_failure.as_deref()),
            section_template: resolve_section_template(settings.template.sections.as_deref()),
            checkpoint_path: resolve_path(
                &lookup,
                "OMNI_REPOST_CHECKPOINT_PATH",
                settings.files.checkpoint_path.as_ref(),
                DEFAULT_CHECKPOINT_PATH,
            ),
            last_check_path: resolve_path(
                &lookup,
                "OMNI_REPOST_LAST_CHECK_PATH",
                settings.files.last_check_path.as_ref(),
                DEFAULT_LAST_CHECK_PATH,
            ),
            authors_path: resolve_path(
                &lookup,
                "OMNI_REPOST_AUTHORS_PATH",
                settings.files.authors_path.as_ref(),
                DEFAULT_AUTHORS_PATH,
            ),
            temp_dir: resolve_path(
                &lookup,
                "OMNI_REPOST_TEMP_DIR",
                settings.files.temp_dir.as_ref(),
                DEFAULT_TEMP_DIR,
            ),
        }
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            section_template: self.section_template.clone(),
            chunk_pause: self.chunk_pause,
        }
    }

    pub fn require_vk_token(&self) -> anyhow::Result<&str> {
        self.vk_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("VK token is not configured (set VK_TOKEN or vk.token)"))
    }

    pub fn require_vk_domain(&self) -> anyhow::Result<&str> {
        self.vk_domain.as_deref().ok_or_else(|| {
            anyhow::anyhow!("VK domain is not configured (set OMNI_REPOST_VK_DOMAIN or vk.domain)")
        })
    }

    pub fn require_telegram_bot_token(&self) -> anyhow::Result<&str> {
        self.telegram_bot_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Telegram bot token is not configured (set TELEGRAM_BOT_TOKEN or telegram.bot_token)"
            )
        })
    }

    pub fn require_telegram_channel(&self) -> anyhow::Result<&str> {
        self.telegram_channel.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Telegram channel is not configured (set OMNI_REPOST_TELEGRAM_CHANNEL or telegram.channel)"
            )
        })
    }
}

fn resolve_string<F>(lookup: &F, name: &str, setting_value: Option<&String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .or_else(|| setting_value.cloned())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_path<F>(lookup: &F, name: &str, setting_value: Option<&String>, default: &str) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    PathBuf::from(resolve_string(lookup, name, setting_value).unwrap_or_else(|| default.to_string()))
}

fn resolve_positive<F, T>(lookup: &F, name: &str, setting_value: Option<T>, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + Copy + std::fmt::Display,
{
    if let Some(raw) = lookup(name) {
        match raw.trim().parse::<T>() {
            Ok(value) if value > T::default() => return value,
            _ => tracing::warn!(
                env_var = %name,
                value = %raw,
                "invalid runtime config env value; using settings/default"
            ),
        }
    }
    match setting_value {
        Some(value) if value > T::default() => value,
        Some(value) => {
            tracing::warn!(
                setting = %name,
                value = %value,
                default = %default,
                "invalid runtime config settings value; using default"
            );
            default
        }
        None => default,
    }
}

fn resolve_bool<F>(lookup: &F, name: &str, setting_value: Option<bool>, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => return true,
            "0" | "false" | "no" | "off" => return false,
            _ => tracing::warn!(
                env_var = %name,
                value = %raw,
                "invalid runtime config env value; using settings/default"
            ),
        }
    }
    setting_value.unwrap_or(default)
}

fn resolve_partial_failure<F>(lookup: &F, setting_value: Option<&str>) -> PartialFailurePolicy
where
    F: Fn(&str) -> Option<String>,
{
    const NAME: &str = "OMNI_REPOST_PARTIAL_FAILURE";
    if let Some(raw) = lookup(NAME) {
        match raw.parse() {
            Ok(policy) => return policy,
            Err(error) => tracing::warn!(env_var = NAME, error = %error, "invalid env value; using settings/default"),
        }
    }
    match setting_value.map(str::parse::<PartialFailurePolicy>) {
        Some(Ok(policy)) => policy,
        Some(Err(error)) => {
            tracing::warn!(setting = "runtime.partial_failure", error = %error, "invalid setting; using default");
            PartialFailurePolicy::default()
        }
        None => PartialFailurePolicy::default(),
    }
}

fn resolve_section_template(labels: Option<&[String]>) -> Option<SectionTemplate> {
    match labels? {
        [first, second] => {
            let template = SectionTemplate::new(first.clone(), second.clone());
            if template.is_none() {
                tracing::warn!("template.sections contains a blank label; template disabled");
            }
            template
        }
        other => {
            tracing::warn!(
                labels = other.len(),
                "template.sections must hold exactly two labels; template disabled"
            );
            None
        }
    }
}
