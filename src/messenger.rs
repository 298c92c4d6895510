//! Operations the notifier needs from the messaging service.
//!
//! [`crate::integrations::TelegramMessenger`] talks to the Bot API; tests
//! substitute a recording double.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// One update delivered by the long-poll stream.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundUpdate {
    /// Update id; the next poll starts at `id + 1`.
    pub id: i64,
    /// The message carried by the update, as a structured value.
    /// `None` for updates that are not messages (edits, callbacks, ...).
    pub message: Option<Value>,
}

impl InboundUpdate {
    pub fn new(id: i64, message: Option<Value>) -> Self {
        Self { id, message }
    }
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, recipient: i64, body: &str) -> Result<()>;

    /// Upload `content` as a document named `filename`.
    async fn send_document(
        &self,
        recipient: i64,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<()>;

    /// Drop any registered webhook so long polling can receive updates.
    async fn remove_webhook(&self) -> Result<()>;

    /// Long-poll for updates starting at `offset`, waiting up to `timeout_secs`.
    async fn get_updates(&self, offset: i64, timeout_secs: u32) -> Result<Vec<InboundUpdate>>;
}
