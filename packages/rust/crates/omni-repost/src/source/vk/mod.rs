//! VK community wall source.
//!
//! Reads `wall.get`, drops pinned posts, ads and already delivered ids, and
//! turns each remaining item into a [`Post`]:
//!
//! - text is HTML-escaped, mentions become links, reposts get a header;
//! - photos use their largest size;
//! - videos go through [`RenditionSelector`]; when no rendition can be sent
//!   the public video page is appended to the text instead;
//! - documents are downloaded into the temp directory;
//! - link attachments are appended when the text does not already carry them.

mod api;
mod documents;
mod links;
mod normalize;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use crate::authors::AuthorDirectory;
use crate::post::Post;
use crate::rendition::{DEFAULT_VIDEO_SIZE_CEILING_BYTES, MetadataProbe, RenditionSelector};

use super::PostSource;
use documents::{document_file_name, reset_temp_dir};
use links::video_deep_link;
use normalize::{compose_text, largest_photo_url, should_skip};

pub use api::{VK_DEFAULT_API_BASE, VK_DEFAULT_API_VERSION, VkApiClient, VkApiError, WallQuery};
pub use normalize::REPOST_HEADER;
pub use types::{VkDoc, VkLink, VkPhoto, VkPhotoSize, VkVideoRef, WallAttachment, WallItem};

const AUTHOR_SIGNATURE_PREFIX: &str = "Author:";

#[derive(Debug, Clone)]
pub struct VkSourceConfig {
    /// Community short name, or `clubN` / `publicN`.
    pub domain: String,
    /// `wall.get` filter (`owner`, `all`, ...).
    pub filter: String,
    pub count: u32,
    pub temp_dir: PathBuf,
    pub video_size_ceiling: u64,
}

impl VkSourceConfig {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            filter: "owner".to_string(),
            count: 10,
            temp_dir: PathBuf::from("temp"),
            video_size_ceiling: DEFAULT_VIDEO_SIZE_CEILING_BYTES,
        }
    }
}

pub struct VkSource {
    api: VkApiClient,
    config: VkSourceConfig,
    probe: Arc<dyn MetadataProbe>,
    authors: AuthorDirectory,
}

impl VkSource {
    pub fn new(
        api: VkApiClient,
        config: VkSourceConfig,
        probe: Arc<dyn MetadataProbe>,
        authors: AuthorDirectory,
    ) -> Self {
        Self {
            api,
            config,
            probe,
            authors,
        }
    }

    /// Build a [`Post`] from one wall item. Attachment failures degrade to
    /// links in the text; they never fail the post.
    pub async fn normalize(&self, item: &WallItem) -> Post {
        let repost_name = match item.copy_history.first() {
            Some(inner) if inner.owner_id < 0 => self.repost_source_name(-inner.owner_id).await,
            _ => None,
        };
        let mut text = compose_text(item, repost_name.as_deref());
        let mut builder = Post::builder(item.id);
        let mut trailing_links = Vec::new();

        let attachments = item.attachments.iter().chain(
            item.copy_history
                .first()
                .into_iter()
                .flat_map(|inner| inner.attachments.iter()),
        );
        for (index, attachment) in attachments.enumerate() {
            match attachment.kind.as_str() {
                "photo" => {
                    if let Some(url) = attachment.photo.as_ref().and_then(largest_photo_url) {
                        builder = builder.photo(url);
                    }
                }
                "video" => {
                    let Some(video) = attachment.video.as_ref() else {
                        continue;
                    };
                    match self.resolve_video(video).await {
                        Some(url) => builder = builder.video(url),
                        None => trailing_links.push(video_deep_link(video.owner_id, video.id)),
                    }
                }
                "doc" => {
                    let Some(doc) = attachment.doc.as_ref() else {
                        continue;
                    };
                    match self.download_document(doc, item.id, index).await {
                        Some(path) => builder = builder.document(doc.title.clone(), path),
                        None => trailing_links.push(doc.url.clone()),
                    }
                }
                "link" => {
                    if let Some(link) = attachment.link.as_ref() {
                        trailing_links.push(link.url.clone());
                    }
                }
                other => tracing::debug!(post_id = item.id, kind = other, "ignoring attachment"),
            }
        }

        for link in &trailing_links {
            normalize::push_link_line(&mut text, link);
        }
        if let Some(signature) = item.signer_id.and_then(|id| self.authors.link_for(id)) {
            normalize::push_paragraph(&mut text, &format!("{AUTHOR_SIGNATURE_PREFIX} {signature}"));
        }

        builder.text(text).build()
    }

    async fn repost_source_name(&self, group_id: i64) -> Option<String> {
        match self.api.group_name(group_id).await {
            Ok(name) => name,
            Err(error) => {
                tracing::warn!(group_id, error = %error, "failed to resolve repost source name");
                None
            }
        }
    }

    async fn resolve_video(&self, video: &VkVideoRef) -> Option<String> {
        let catalog = match self
            .api
            .video_catalog(video.owner_id, video.id, video.access_key.as_deref())
            .await
        {
            Ok(Some(catalog)) => catalog,
            Ok(None) => {
                tracing::info!(
                    owner_id = video.owner_id,
                    video_id = video.id,
                    "video has no downloadable renditions; linking instead"
                );
                return None;
            }
            Err(error) => {
                tracing::warn!(
                    owner_id = video.owner_id,
                    video_id = video.id,
                    error = %error,
                    "failed to fetch video files; linking instead"
                );
                return None;
            }
        };

        let selector = RenditionSelector::new(self.probe.as_ref(), self.config.video_size_ceiling);
        let selected = selector.select(&catalog).await?;
        if selected.exceeded_size {
            return None;
        }
        Some(selected.rendition.url)
    }

    async fn download_document(
        &self,
        doc: &VkDoc,
        post_id: i64,
        index: usize,
    ) -> Option<PathBuf> {
        if doc.url.is_empty() {
            return None;
        }
        let fallback_stem = format!("doc_{post_id}_{index}");
        let path = documents::document_path(
            &self.config.temp_dir,
            post_id,
            index,
            &document_file_name(doc, &fallback_stem),
        );
        let dir = path.parent().unwrap_or(self.config.temp_dir.as_path());
        if let Err(error) = tokio::fs::create_dir_all(dir).await {
            tracing::warn!(
                dir = %dir.display(),
                error = %error,
                "failed to create document dir; linking document instead"
            );
            return None;
        }
        match self.api.download(&doc.url, &path).await {
            Ok(()) => Some(path),
            Err(error) => {
                tracing::warn!(title = %doc.title, error = %error, "document download failed; linking instead");
                None
            }
        }
    }
}

#[async_trait]
impl PostSource for VkSource {
    fn name(&self) -> &str {
        "vk"
    }

    async fn fetch_since(&self, last_delivered_id: i64) -> anyhow::Result<Vec<Post>> {
        let query = WallQuery {
            domain: self.config.domain.clone(),
            filter: self.config.filter.clone(),
            count: self.config.count,
            offset: 0,
        };
        let items = self
            .api
            .wall_get(&query)
            .await
            .with_context(|| format!("failed to fetch wall of {}", self.config.domain))?;

        let mut fresh: Vec<&WallItem> = items
            .iter()
            .filter(|item| !should_skip(item, last_delivered_id))
            .collect();
        fresh.sort_by_key(|item| item.id);
        tracing::info!(
            fetched = items.len(),
            fresh = fresh.len(),
            last_delivered_id,
            "filtered VK wall posts"
        );

        let mut posts = Vec::with_capacity(fresh.len());
        for item in fresh {
            posts.push(self.normalize(item).await);
        }
        Ok(posts)
    }

    async fn end_cycle(&self) -> anyhow::Result<()> {
        reset_temp_dir(&self.config.temp_dir)
            .await
            .with_context(|| format!("failed to reset temp dir {}", self.config.temp_dir.display()))
    }
}
