//! Normalized post record handed from the source adapter to the composer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A document attachment already downloaded to local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub local_path: PathBuf,
}

/// One normalized unit of source content to be reposted.
///
/// Videos are resolved URLs (the rendition was picked upstream); items that
/// could not be resolved were already replaced by deep links in `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl Post {
    pub fn builder(id: i64) -> PostBuilder {
        PostBuilder {
            post: Self {
                id,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostBuilder {
    post: Post,
}

impl PostBuilder {
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.post.text = text.into();
        self
    }

    pub fn photo(mut self, url: impl Into<String>) -> Self {
        self.post.photos.push(url.into());
        self
    }

    pub fn video(mut self, url: impl Into<String>) -> Self {
        self.post.videos.push(url.into());
        self
    }

    pub fn document(mut self, title: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        self.post.documents.push(Document {
            title: title.into(),
            local_path: local_path.into(),
        });
        self
    }

    pub fn build(self) -> Post {
        self.post
    }
}
