/// Telegram channel posting into a single chat (usually `@channel`).
pub struct TelegramChannel {
    pub(super) bot_token: String,
    pub(super) chat_id: String,
    pub(super) api_base_url: String,
    pub(super) client: reqwest::Client,
}

impl TelegramChannel {
    pub(super) fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token
        )
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}
