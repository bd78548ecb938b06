use std::time::Duration;

use serde::Serialize;

use crate::post::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }
}

/// One entry of a media group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl MediaItem {
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            caption: None,
        }
    }
}

/// One atomic delivery operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SendStep {
    TextMessage {
        body: String,
    },
    SinglePhoto {
        url: String,
        caption: Option<String>,
    },
    SingleVideo {
        url: String,
        caption: Option<String>,
    },
    MediaGroup {
        items: Vec<MediaItem>,
    },
    DocumentGroup {
        items: Vec<Document>,
    },
}

impl SendStep {
    pub fn text(body: impl Into<String>) -> Self {
        Self::TextMessage { body: body.into() }
    }

    /// Single-item step for a photo or a video.
    pub fn single(item: MediaItem) -> Self {
        match item.kind {
            MediaKind::Photo => Self::SinglePhoto {
                url: item.url,
                caption: item.caption,
            },
            MediaKind::Video => Self::SingleVideo {
                url: item.url,
                caption: item.caption,
            },
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextMessage { .. } => "text_message",
            Self::SinglePhoto { .. } => "single_photo",
            Self::SingleVideo { .. } => "single_video",
            Self::MediaGroup { .. } => "media_group",
            Self::DocumentGroup { .. } => "document_group",
        }
    }
}

/// A plan entry plus the pause to observe after it succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub step: SendStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_after: Option<Duration>,
}

/// Ordered send operations for one post. Executed once, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: SendStep) {
        self.steps.push(PlannedStep {
            step,
            pause_after: None,
        });
    }

    pub fn push_paced(&mut self, step: SendStep, pause_after: Duration) {
        self.steps.push(PlannedStep {
            step,
            pause_after: Some(pause_after),
        });
    }

    pub fn entries(&self) -> &[PlannedStep] {
        &self.steps
    }

    pub fn steps(&self) -> impl Iterator<Item = &SendStep> {
        self.steps.iter().map(|entry| &entry.step)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
