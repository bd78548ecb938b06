use crate::compose::MediaItem;

use super::super::TelegramChannel;
use super::super::constants::TELEGRAM_PARSE_MODE;
use super::super::error::TelegramApiError;

impl TelegramChannel {
    pub(in crate::channels::telegram) async fn send_html_message(
        &self,
        text: &str,
    ) -> Result<(), TelegramApiError> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": TELEGRAM_PARSE_MODE,
        });
        self.send_api_request_once("sendMessage", &body).await
    }

    /// `sendPhoto` / `sendVideo` with a remote URL as the media field.
    pub(in crate::channels::telegram) async fn send_media_by_url(
        &self,
        method: &str,
        media_field: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<(), TelegramApiError> {
        let mut body = serde_json::json!({
            "chat_id": self.chat_id,
        });
        body[media_field] = serde_json::json!(url);
        if let Some(caption) = caption {
            body["caption"] = serde_json::json!(caption);
            body["parse_mode"] = serde_json::json!(TELEGRAM_PARSE_MODE);
        }
        self.send_api_request_once(method, &body).await
    }

    pub(in crate::channels::telegram) async fn send_media_group_by_url(
        &self,
        items: &[MediaItem],
    ) -> Result<(), TelegramApiError> {
        let media: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                let mut entry = serde_json::json!({
                    "type": item.kind.as_str(),
                    "media": item.url,
                });
                if let Some(caption) = item.caption.as_deref() {
                    entry["caption"] = serde_json::json!(caption);
                    entry["parse_mode"] = serde_json::json!(TELEGRAM_PARSE_MODE);
                }
                entry
            })
            .collect();
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "media": media,
        });
        self.send_api_request_once("sendMediaGroup", &body).await
    }

    async fn send_api_request_once(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<(), TelegramApiError> {
        tracing::debug!(method, chat_id = %self.chat_id, "Telegram API request");
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(TelegramApiError::from_reqwest)?;
        Self::validate_telegram_response(response).await
    }
}
