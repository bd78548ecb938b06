use std::time::Duration;

use reqwest::StatusCode;

use crate::delivery::DeliveryError;

use super::constants::TELEGRAM_DEFAULT_RATE_LIMIT_RETRY_SECS;

#[derive(Debug)]
pub(super) struct TelegramApiError {
    pub(super) status: Option<StatusCode>,
    pub(super) error_code: Option<i64>,
    pub(super) retry_after_secs: Option<u64>,
    pub(super) body: String,
}

impl TelegramApiError {
    pub(super) fn from_reqwest(err: reqwest::Error) -> Self {
        let body = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        Self {
            status: None,
            error_code: None,
            retry_after_secs: None,
            body,
        }
    }

    pub(super) fn is_rate_limited(&self) -> bool {
        self.status == Some(StatusCode::TOO_MANY_REQUESTS) || self.error_code == Some(429)
    }

    /// The Bot API `error_code` wins over the HTTP status when both exist.
    fn effective_code(&self) -> Option<u16> {
        self.error_code
            .and_then(|code| u16::try_from(code).ok())
            .or_else(|| self.status.map(|status| status.as_u16()))
    }

    pub(super) fn into_delivery_error(self) -> DeliveryError {
        if self.is_rate_limited() {
            let retry_after = Duration::from_secs(
                self.retry_after_secs
                    .unwrap_or(TELEGRAM_DEFAULT_RATE_LIMIT_RETRY_SECS),
            );
            return DeliveryError::rate_limited(retry_after, self.to_string());
        }

        match self.effective_code() {
            None | Some(400 | 408) => DeliveryError::transient(self.to_string()),
            Some(code) if code >= 500 => DeliveryError::transient(self.to_string()),
            Some(_) => DeliveryError::permanent(self.to_string()),
        }
    }
}

impl std::fmt::Display for TelegramApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.error_code, self.retry_after_secs) {
            (Some(status), Some(code), Some(retry_after_secs)) => write!(
                f,
                "status={status}, error_code={code}, retry_after={retry_after_secs}s, body={}",
                self.body
            ),
            (Some(status), Some(code), None) => {
                write!(f, "status={status}, error_code={code}, body={}", self.body)
            }
            (Some(status), None, Some(retry_after_secs)) => write!(
                f,
                "status={status}, retry_after={retry_after_secs}s, body={}",
                self.body
            ),
            (Some(status), None, None) => write!(f, "status={status}, body={}", self.body),
            (None, Some(code), _) => write!(f, "error_code={code}, body={}", self.body),
            (None, None, _) => write!(f, "{}", self.body),
        }
    }
}

impl std::error::Error for TelegramApiError {}

pub(super) fn telegram_api_error_retry_after_secs(data: &serde_json::Value) -> Option<u64> {
    data.get("parameters")
        .and_then(|v| v.get("retry_after"))
        .and_then(serde_json::Value::as_u64)
}

pub(super) fn telegram_api_error_code(data: &serde_json::Value) -> Option<i64> {
    data.get("error_code").and_then(serde_json::Value::as_i64)
}

pub(super) fn telegram_api_error_description<'a>(
    data: &'a serde_json::Value,
    fallback: &'a str,
) -> &'a str {
    data.get("description")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}
