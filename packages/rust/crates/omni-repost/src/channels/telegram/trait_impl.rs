use async_trait::async_trait;

use crate::compose::SendStep;
use crate::delivery::{DeliveryChannel, DeliveryError};

use super::TelegramChannel;
use super::error::TelegramApiError;

#[async_trait]
impl DeliveryChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_step(&self, step: &SendStep) -> Result<(), DeliveryError> {
        let result = match step {
            SendStep::TextMessage { body } => self.send_html_message(body).await,
            SendStep::SinglePhoto { url, caption } => {
                self.send_media_by_url("sendPhoto", "photo", url, caption.as_deref())
                    .await
            }
            SendStep::SingleVideo { url, caption } => {
                self.send_media_by_url("sendVideo", "video", url, caption.as_deref())
                    .await
            }
            SendStep::MediaGroup { items } => self.send_media_group_by_url(items).await,
            SendStep::DocumentGroup { items } => return self.send_documents(items).await,
        };
        result.map_err(TelegramApiError::into_delivery_error)
    }
}
