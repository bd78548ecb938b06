use super::TelegramChannel;
use super::client::build_telegram_http_client;
use super::constants::TELEGRAM_DEFAULT_API_BASE;

impl TelegramChannel {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::new_with_base_url(bot_token, chat_id, TELEGRAM_DEFAULT_API_BASE)
    }

    /// Point the channel at another Bot API server (self-hosted or a test mock).
    pub fn new_with_base_url(
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base_url: api_base_url.into(),
            client: build_telegram_http_client(),
        }
    }
}
