//! Reposting engine: VK community wall posts into a Telegram channel.
//!
//! A [`PostSource`] yields normalized [`Post`]s, [`PostComposer`] turns each
//! into an ordered [`Plan`] that fits Telegram's limits, and
//! [`DeliveryExecutor`] sends it step by step through a [`DeliveryChannel`],
//! retrying rate limits and transient failures. [`PollRunner`] wraps the
//! cycle and only advances the [`FileCheckpoint`] after a post is fully sent.

#![allow(missing_docs)]

mod authors;
mod channels;
mod checkpoint;
mod chunking;
mod compose;
mod config;
mod delivery;
mod post;
mod rendition;
mod runner;
mod source;

pub use authors::AuthorDirectory;
pub use channels::{TelegramChannel, telegram::TELEGRAM_DEFAULT_API_BASE};
pub use checkpoint::{CheckpointError, FileCheckpoint};
pub use chunking::{
    CHUNK_CONTINUED_PREFIX, CHUNK_CONTINUES_SUFFIX, chunk_marker_reserve_chars, decorate_chunk,
    split_text, strip_chunk_markers,
};
pub use compose::{
    ComposerConfig, MAX_CAPTION_LENGTH, MAX_MESSAGE_LENGTH, MEDIA_GROUP_MAX_ITEMS,
    MEDIA_GROUP_MIN_ITEMS, MediaItem, MediaKind, Plan, PlannedStep, PostComposer,
    SAFE_CHUNK_LENGTH, SectionTemplate, SectionedText, SendStep, embed_link,
};
pub use config::{
    FilesSettings, PartialFailurePolicy, RepostConfig, RepostSettings, RuntimeSettings,
    TelegramSettings, TemplateSettings, VkSettings, load_repost_settings,
    load_repost_settings_from_paths, repost_settings_paths, set_config_home_override,
};
pub use delivery::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TRANSIENT_COOLDOWN_SECS, DeliveryChannel, DeliveryError,
    DeliveryExecutor, DeliveryReport, ExecutionError, RetryPolicy, RetryState, Sleeper,
    TokioSleeper,
};
pub use post::{Document, Post, PostBuilder};
pub use rendition::{
    DEFAULT_VIDEO_SIZE_CEILING_BYTES, HttpMetadataProbe, MetadataProbe, ProbeError, Rendition,
    RenditionSelector, SelectedRendition, VideoCatalog,
};
pub use runner::{CycleReport, PollRunner, RunOutcome};
pub use source::PostSource;
pub use source::vk::{
    REPOST_HEADER, VK_DEFAULT_API_BASE, VK_DEFAULT_API_VERSION, VkApiClient, VkApiError, VkDoc,
    VkLink, VkPhoto, VkPhotoSize, VkSource, VkSourceConfig, VkVideoRef, WallAttachment, WallItem,
    WallQuery,
};
