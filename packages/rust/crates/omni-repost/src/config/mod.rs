//! Config namespace: YAML settings files and the resolved runtime config.

mod runtime;
mod settings;

pub use runtime::{PartialFailurePolicy, RepostConfig};
pub use settings::{
    FilesSettings, RepostSettings, RuntimeSettings, TelegramSettings, TemplateSettings,
    VkSettings, load_repost_settings, load_repost_settings_from_paths, repost_settings_paths,
    set_config_home_override,
};
