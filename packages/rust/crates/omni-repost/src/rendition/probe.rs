use std::time::Duration;

use async_trait::async_trait;

const PROBE_CONNECT_TIMEOUT_SECS: u64 = 10;
const PROBE_REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("metadata request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("metadata request returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Looks up the byte size of a remote media file without downloading it.
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    async fn byte_size(&self, url: &str) -> Result<u64, ProbeError>;
}

/// `HEAD` request probe reading `Content-Length`; a missing header is 0.
pub struct HttpMetadataProbe {
    client: reqwest::Client,
}

impl HttpMetadataProbe {
    pub fn new() -> Self {
        let client = match reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(PROBE_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(PROBE_REQUEST_TIMEOUT_SECS))
            .build()
        {
            Ok(client) => client,
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "Failed to build metadata probe HTTP client with timeouts; falling back to default client"
                );
                reqwest::Client::new()
            }
        };
        Self { client }
    }
}

impl Default for HttpMetadataProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProbe for HttpMetadataProbe {
    async fn byte_size(&self, url: &str) -> Result<u64, ProbeError> {
        let response = self.client.head(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }
        Ok(response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0))
    }
}
