//! External integrations module.
//!
//! Provides clients for:
//! - Telegram Bot API (messages, documents, long polling)

pub mod telegram;

pub use telegram::TelegramMessenger;
