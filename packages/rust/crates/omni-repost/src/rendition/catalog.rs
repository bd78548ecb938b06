use std::collections::HashMap;

const MP4_LABEL_PREFIX: &str = "mp4_";

/// One encoded quality variant of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub quality_label: String,
    pub url: String,
    /// Filled in by the selector once probed.
    pub byte_size: Option<u64>,
}

impl Rendition {
    pub fn new(quality_label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            quality_label: quality_label.into(),
            url: url.into(),
            byte_size: None,
        }
    }

    /// Numeric quality parsed from labels like `mp4_720`.
    pub fn quality(&self) -> Option<u32> {
        self.quality_label
            .strip_prefix(MP4_LABEL_PREFIX)
            .and_then(|height| height.parse().ok())
    }
}

/// Renditions of a single logical video, keyed by quality label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCatalog {
    renditions: Vec<Rendition>,
}

impl VideoCatalog {
    /// Build from a `label -> url` map (the VK `files` object).
    ///
    /// Only labels with a numeric quality are kept; a later duplicate label
    /// replaces an earlier one.
    pub fn from_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut by_label: HashMap<String, Rendition> = HashMap::new();
        for (label, url) in files {
            let rendition = Rendition::new(label, url);
            if rendition.quality().is_some() {
                by_label.insert(rendition.quality_label.clone(), rendition);
            }
        }
        Self {
            renditions: by_label.into_values().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.renditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.renditions.len()
    }

    /// Renditions ordered from highest to lowest quality.
    pub fn by_descending_quality(&self) -> Vec<Rendition> {
        let mut ordered = self.renditions.clone();
        ordered.sort_by(|a, b| {
            b.quality()
                .cmp(&a.quality())
                .then_with(|| a.quality_label.cmp(&b.quality_label))
        });
        ordered
    }
}
