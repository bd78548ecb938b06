/// Public Bot API endpoint.
pub const TELEGRAM_DEFAULT_API_BASE: &str = "https://api.telegram.org";

pub(super) const TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
pub(super) const TELEGRAM_HTTP_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Used when a 429 response omits `parameters.retry_after`.
pub(super) const TELEGRAM_DEFAULT_RATE_LIMIT_RETRY_SECS: u64 = 5;
pub(super) const TELEGRAM_PARSE_MODE: &str = "HTML";
