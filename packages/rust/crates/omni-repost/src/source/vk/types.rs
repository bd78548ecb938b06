//! Subset of the VK API response shapes the source reads.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct VkEnvelope<T> {
    pub response: Option<T>,
    pub error: Option<VkErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VkErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WallItem {
    pub id: i64,
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_pinned: i64,
    #[serde(default)]
    pub marked_as_ads: i64,
    #[serde(default)]
    pub signer_id: Option<i64>,
    #[serde(default)]
    pub attachments: Vec<WallAttachment>,
    #[serde(default)]
    pub copy_history: Vec<WallItem>,
}

impl WallItem {
    pub fn is_pinned(&self) -> bool {
        self.is_pinned != 0
    }

    pub fn is_ad(&self) -> bool {
        self.marked_as_ads != 0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WallAttachment {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub photo: Option<VkPhoto>,
    pub video: Option<VkVideoRef>,
    pub doc: Option<VkDoc>,
    pub link: Option<VkLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkPhoto {
    #[serde(default)]
    pub sizes: Vec<VkPhotoSize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkPhotoSize {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: u64,
    #[serde(default)]
    pub height: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkVideoRef {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub access_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkDoc {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkLink {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VkVideoItem {
    /// `mp4_*` URLs plus unrelated keys such as `failover_host`.
    #[serde(default)]
    pub files: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VkGroup {
    #[serde(default)]
    pub name: String,
}

/// `groups.getById` answers with a bare list on older API versions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GroupsResponse {
    List(Vec<VkGroup>),
    Wrapped { groups: Vec<VkGroup> },
}

impl GroupsResponse {
    pub fn into_first_name(self) -> Option<String> {
        let groups = match self {
            Self::List(groups) | Self::Wrapped { groups } => groups,
        };
        groups
            .into_iter()
            .next()
            .map(|group| group.name)
            .filter(|name| !name.is_empty())
    }
}
