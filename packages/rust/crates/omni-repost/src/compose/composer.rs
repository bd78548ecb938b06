use std::time::Duration;

use crate::chunking::{decorate_chunk, split_text};
use crate::post::{Document, Post};

use super::constants::{
    DEFAULT_CHUNK_PAUSE_MS, MAX_CAPTION_LENGTH, MAX_MESSAGE_LENGTH, MEDIA_GROUP_MAX_ITEMS,
    SAFE_CHUNK_LENGTH,
};
use super::plan::{MediaItem, MediaKind, Plan, SendStep};
use super::template::SectionTemplate;

#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Two-subsection layout recognized in post text, if any.
    pub section_template: Option<SectionTemplate>,
    /// Pause after each chunk of an oversized text.
    pub chunk_pause: Duration,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            section_template: None,
            chunk_pause: Duration::from_millis(DEFAULT_CHUNK_PAUSE_MS),
        }
    }
}

/// Turns a normalized [`Post`] into an ordered send [`Plan`].
///
/// Composition is pure: it never fails and never touches the network.
#[derive(Debug, Clone, Default)]
pub struct PostComposer {
    config: ComposerConfig,
}

impl PostComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, post: &Post) -> Plan {
        let mut plan = Plan::new();
        let media = media_items(post);

        let sectioned = self
            .config
            .section_template
            .as_ref()
            .and_then(|template| template.split(&post.text).map(|split| (template, split)));

        match sectioned {
            Some((template, split)) => {
                self.push_media_with_caption(&mut plan, media, split.lead);
                for (label, body) in [
                    (template.first_label(), split.first),
                    (template.second_label(), split.second),
                ] {
                    if !body.is_empty() {
                        self.push_text(&mut plan, &SectionTemplate::labelled(label, body));
                    }
                }
            }
            None => self.push_media_with_caption(&mut plan, media, &post.text),
        }

        push_documents(&mut plan, &post.documents);
        tracing::debug!(
            post_id = post.id,
            steps = plan.len(),
            "composed delivery plan"
        );
        plan
    }

    fn push_media_with_caption(&self, plan: &mut Plan, mut media: Vec<MediaItem>, text: &str) {
        let has_text = !text.trim().is_empty();
        let text_chars = text.chars().count();

        match media.len() {
            0 => {
                if has_text {
                    self.push_text(plan, text);
                }
            }
            1 => {
                let Some(mut item) = media.pop() else {
                    return;
                };
                if !has_text {
                    plan.push(SendStep::single(item));
                } else if text_chars <= MAX_CAPTION_LENGTH {
                    item.caption = Some(text.to_string());
                    plan.push(SendStep::single(item));
                } else {
                    let embedded = embed_link(&item.url, text);
                    if embedded.chars().count() <= MAX_MESSAGE_LENGTH {
                        plan.push(SendStep::text(embedded));
                    } else {
                        self.push_text(plan, text);
                        plan.push(SendStep::single(item));
                    }
                }
            }
            _ => {
                if has_text {
                    if text_chars <= MAX_CAPTION_LENGTH {
                        if let Some(first) = media.first_mut() {
                            first.caption = Some(text.to_string());
                        }
                    } else {
                        self.push_text(plan, text);
                    }
                }
                push_media_batches(plan, media);
            }
        }
    }

    /// One message when it fits, otherwise paced chunks with markers.
    fn push_text(&self, plan: &mut Plan, text: &str) {
        if text.chars().count() <= MAX_MESSAGE_LENGTH {
            plan.push(SendStep::text(text));
            return;
        }

        let chunks = split_text(text, SAFE_CHUNK_LENGTH);
        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            plan.push_paced(
                SendStep::text(decorate_chunk(chunk, index, total)),
                self.config.chunk_pause,
            );
        }
    }
}

/// Text message whose link preview shows the media at `url`.
pub fn embed_link(url: &str, text: &str) -> String {
    format!("<a href=\"{url}\"> </a>{text}")
}

fn media_items(post: &Post) -> Vec<MediaItem> {
    post.photos
        .iter()
        .map(|url| MediaItem::new(MediaKind::Photo, url.as_str()))
        .chain(
            post.videos
                .iter()
                .map(|url| MediaItem::new(MediaKind::Video, url.as_str())),
        )
        .collect()
}

fn push_media_batches(plan: &mut Plan, media: Vec<MediaItem>) {
    let mut remaining = media.into_iter().peekable();
    while remaining.peek().is_some() {
        let mut batch: Vec<MediaItem> = remaining.by_ref().take(MEDIA_GROUP_MAX_ITEMS).collect();
        if batch.len() == 1 {
            if let Some(item) = batch.pop() {
                plan.push(SendStep::single(item));
            }
        } else {
            plan.push(SendStep::MediaGroup { items: batch });
        }
    }
}

fn push_documents(plan: &mut Plan, documents: &[Document]) {
    for batch in documents.chunks(MEDIA_GROUP_MAX_ITEMS) {
        plan.push(SendStep::DocumentGroup {
            items: batch.to_vec(),
        });
    }
}
