//! Delivery channels.

pub mod telegram;

pub use telegram::TelegramChannel;
