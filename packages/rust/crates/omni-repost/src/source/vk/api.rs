use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::rendition::VideoCatalog;

use super::types::{GroupsResponse, ItemsResponse, VkEnvelope, VkVideoItem, WallItem};

pub const VK_DEFAULT_API_BASE: &str = "https://api.vk.com/method";
pub const VK_DEFAULT_API_VERSION: &str = "5.199";

const VK_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const VK_HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;

static NUMERIC_COMMUNITY_DOMAIN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:club|public)(\d+)$").ok());

#[derive(Debug, thiserror::Error)]
pub enum VkApiError {
    #[error("VK request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("VK response for {method} carried neither `response` nor `error`")]
    EmptyResponse { method: String },
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// `wall.get` paging and filter parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallQuery {
    pub domain: String,
    pub filter: String,
    pub count: u32,
    pub offset: u32,
}

/// Thin VK API client for the three read methods the source needs.
pub struct VkApiClient {
    client: reqwest::Client,
    access_token: String,
    api_version: String,
    api_base_url: String,
}

impl VkApiClient {
    pub fn new(access_token: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self::new_with_base_url(access_token, api_version, VK_DEFAULT_API_BASE)
    }

    pub fn new_with_base_url(
        access_token: impl Into<String>,
        api_version: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: build_vk_http_client(),
            access_token: access_token.into(),
            api_version: api_version.into(),
            api_base_url: api_base_url.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base_url.trim_end_matches('/'))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, VkApiError> {
        let response = self
            .client
            .get(self.method_url(method))
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("v", self.api_version.as_str()),
            ])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let envelope: VkEnvelope<T> = response.json().await?;
        match (envelope.response, envelope.error) {
            (Some(response), _) => Ok(response),
            (None, Some(error)) => Err(VkApiError::Api {
                code: error.error_code,
                message: error.error_msg,
            }),
            (None, None) => Err(VkApiError::EmptyResponse {
                method: method.to_string(),
            }),
        }
    }

    pub async fn wall_get(&self, query: &WallQuery) -> Result<Vec<WallItem>, VkApiError> {
        let mut params = vec![wall_owner_param(&query.domain)];
        params.push(("filter", query.filter.clone()));
        params.push(("count", query.count.to_string()));
        params.push(("offset", query.offset.to_string()));
        tracing::info!(domain = %query.domain, count = query.count, "fetching VK wall posts");
        let response: ItemsResponse<WallItem> = self.call("wall.get", &params).await?;
        Ok(response.items)
    }

    /// Renditions of one video; `None` when VK returns no playable files
    /// (deleted, private, or an external player).
    pub async fn video_catalog(
        &self,
        owner_id: i64,
        video_id: i64,
        access_key: Option<&str>,
    ) -> Result<Option<VideoCatalog>, VkApiError> {
        let videos = match access_key.filter(|key| !key.is_empty()) {
            Some(key) => format!("{owner_id}_{video_id}_{key}"),
            None => format!("{owner_id}_{video_id}"),
        };
        let response: ItemsResponse<VkVideoItem> =
            self.call("video.get", &[("videos", videos)]).await?;
        let Some(item) = response.items.into_iter().next() else {
            return Ok(None);
        };
        let catalog = VideoCatalog::from_files(
            item.files
                .into_iter()
                .filter_map(|(label, value)| value.as_str().map(|url| (label, url.to_string()))),
        );
        Ok((!catalog.is_empty()).then_some(catalog))
    }

    /// Display name of a community, given its positive group id.
    pub async fn group_name(&self, group_id: i64) -> Result<Option<String>, VkApiError> {
        let response: GroupsResponse = self
            .call("groups.getById", &[("group_id", group_id.to_string())])
            .await?;
        Ok(response.into_first_name())
    }

    /// Stream a remote file to `destination`.
    pub async fn download(&self, url: &str, destination: &Path) -> Result<(), VkApiError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|source| VkApiError::Io {
                path: destination.display().to_string(),
                source,
            })
    }
}

/// `clubN` / `publicN` address the wall by numeric owner id; anything else is
/// a short name.
pub fn wall_owner_param(domain: &str) -> (&'static str, String) {
    let numeric = NUMERIC_COMMUNITY_DOMAIN
        .as_ref()
        .and_then(|pattern| pattern.captures(domain))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string());
    match numeric {
        Some(id) => ("owner_id", format!("-{id}")),
        None => ("domain", domain.to_string()),
    }
}

fn build_vk_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(VK_HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(VK_HTTP_REQUEST_TIMEOUT_SECS))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to build VK HTTP client with timeouts; falling back to default client"
            );
            reqwest::Client::new()
        }
    }
}
