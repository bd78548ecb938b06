//! Telegram Bot API channel limited to the send operations a plan needs.

mod client;
mod constants;
mod constructor;
mod error;
mod send_api;
mod state;
mod trait_impl;

pub use constants::TELEGRAM_DEFAULT_API_BASE;
pub use state::TelegramChannel;
