//! Settings file loader for omni-repost.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/repost.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/omni-repost/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/repost.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "omni-repost/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepostSettings {
    #[serde(default)]
    pub vk: VkSettings,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub runtime: RuntimeSettings,
    #[serde(default)]
    pub files: FilesSettings,
    #[serde(default)]
    pub template: TemplateSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkSettings {
    pub domain: Option<String>,
    pub api_version: Option<String>,
    pub filter: Option<String>,
    pub count: Option<u32>,
    pub token: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramSettings {
    pub channel: Option<String>,
    pub bot_token: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    pub interval_secs: Option<u64>,
    pub single_start: Option<bool>,
    pub video_size_ceiling_bytes: Option<u64>,
    pub max_attempts: Option<u32>,
    pub transient_cooldown_secs: Option<u64>,
    pub chunk_pause_ms: Option<u64>,
    pub partial_failure: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesSettings {
    pub checkpoint_path: Option<String>,
    pub last_check_path: Option<String>,
    pub authors_path: Option<String>,
    pub temp_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateSettings {
    /// Exactly two labels: `[first, second]`.
    pub sections: Option<Vec<String>>,
}

impl RepostSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            vk: self.vk.merge(overlay.vk),
            telegram: self.telegram.merge(overlay.telegram),
            runtime: self.runtime.merge(overlay.runtime),
            files: self.files.merge(overlay.files),
            template: self.template.merge(overlay.template),
        }
    }
}

impl VkSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            domain: overlay.domain.or(self.domain),
            api_version: overlay.api_version.or(self.api_version),
            filter: overlay.filter.or(self.filter),
            count: overlay.count.or(self.count),
            token: overlay.token.or(self.token),
            api_base_url: overlay.api_base_url.or(self.api_base_url),
        }
    }
}

impl TelegramSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            channel: overlay.channel.or(self.channel),
            bot_token: overlay.bot_token.or(self.bot_token),
            api_base_url: overlay.api_base_url.or(self.api_base_url),
        }
    }
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            interval_secs: overlay.interval_secs.or(self.interval_secs),
            single_start: overlay.single_start.or(self.single_start),
            video_size_ceiling_bytes: overlay
                .video_size_ceiling_bytes
                .or(self.video_size_ceiling_bytes),
            max_attempts: overlay.max_attempts.or(self.max_attempts),
            transient_cooldown_secs: overlay
                .transient_cooldown_secs
                .or(self.transient_cooldown_secs),
            chunk_pause_ms: overlay.chunk_pause_ms.or(self.chunk_pause_ms),
            partial_failure: overlay.partial_failure.or(self.partial_failure),
        }
    }
}

impl FilesSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            checkpoint_path: overlay.checkpoint_path.or(self.checkpoint_path),
            last_check_path: overlay.last_check_path.or(self.last_check_path),
            authors_path: overlay.authors_path.or(self.authors_path),
            temp_dir: overlay.temp_dir.or(self.temp_dir),
        }
    }
}

impl TemplateSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            sections: overlay.sections.or(self.sections),
        }
    }
}

pub fn load_repost_settings() -> RepostSettings {
    let (system_path, user_path) = repost_settings_paths();
    load_repost_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn repost_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_repost_settings_from_paths(system: &Path, user: &Path) -> RepostSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RepostSettings {
    if !path.exists() {
        return RepostSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RepostSettings::default();
        }
    };
    match serde_yaml::from_str::<RepostSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RepostSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
