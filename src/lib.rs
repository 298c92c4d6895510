//! Telegram notifier library
//!
//! This library provides tools to:
//! - Send a text message or a file to one fixed Telegram chat
//! - Capture the next message sent to the bot, to look up chat ids
//! - Merge settings from a YAML file, the environment and CLI flags

pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod integrations;
pub mod messenger;

// Re-export common types
pub use config::{Overrides, Settings};
pub use error::{Error, Result};
pub use integrations::TelegramMessenger;
pub use messenger::{InboundUpdate, Messenger};
