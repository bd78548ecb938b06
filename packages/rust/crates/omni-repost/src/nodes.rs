use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use omni_repost::{
    AuthorDirectory, DeliveryExecutor, FileCheckpoint, HttpMetadataProbe, PollRunner, Post,
    PostComposer, RepostConfig, RunOutcome, TelegramChannel, VkApiClient, VkSource,
    VkSourceConfig,
};

pub(crate) async fn run_poll_mode(
    config: RepostConfig,
    once: bool,
    interval_secs: Option<u64>,
) -> Result<()> {
    let vk_api = VkApiClient::new_with_base_url(
        config.require_vk_token()?,
        config.vk_api_version.clone(),
        config.vk_api_base_url.clone(),
    );
    let authors = AuthorDirectory::load(&config.authors_path)?;
    let source = VkSource::new(
        vk_api,
        VkSourceConfig {
            domain: config.require_vk_domain()?.to_string(),
            filter: config.vk_filter.clone(),
            count: config.vk_count,
            temp_dir: config.temp_dir.clone(),
            video_size_ceiling: config.video_size_ceiling_bytes,
        },
        Arc::new(HttpMetadataProbe::new()),
        authors,
    );

    let bot_token = config.require_telegram_bot_token()?;
    let channel_id = config.require_telegram_channel()?;
    let channel = match config.telegram_api_base_url.as_deref() {
        Some(base_url) => TelegramChannel::new_with_base_url(bot_token, channel_id, base_url),
        None => TelegramChannel::new(bot_token, channel_id),
    };

    let checkpoint = FileCheckpoint::new(&config.checkpoint_path, &config.last_check_path);
    // Fail fast on a bad checkpoint before the first fetch.
    let last_delivered_id = checkpoint.load().await?;

    let interval = interval_secs
        .filter(|secs| *secs > 0)
        .map_or(config.interval, Duration::from_secs);
    let single_start = once || config.single_start;
    tracing::info!(
        domain = config.vk_domain.as_deref().unwrap_or_default(),
        channel = channel_id,
        last_delivered_id,
        checkpoint = %checkpoint.id_path().display(),
        interval_secs = interval.as_secs(),
        single_start,
        "omni-repost started"
    );

    let runner = PollRunner::new(
        Arc::new(source),
        Arc::new(channel),
        PostComposer::new(config.composer_config()),
        DeliveryExecutor::new(config.retry_policy),
        checkpoint,
    )
    .with_partial_failure(config.partial_failure);

    match runner.run_forever(interval, single_start).await? {
        RunOutcome::Completed { cycles } => {
            tracing::info!(cycles, "omni-repost finished");
        }
        RunOutcome::Interrupted { cycles } => {
            tracing::info!(cycles, "omni-repost stopped by the user");
        }
    }
    Ok(())
}

pub(crate) fn run_compose_mode(config: &RepostConfig, post_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(post_path)
        .with_context(|| format!("failed to read post file {}", post_path.display()))?;
    let post: Post = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse post file {}", post_path.display()))?;
    let plan = PostComposer::new(config.composer_config()).compose(&post);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
