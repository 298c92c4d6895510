//! Recording [`Messenger`] double for integration tests.
//!
//! Records every call so tests can assert on exactly what would have been
//! sent, and replays scripted `get_updates` batches in order.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use telegrammer::commands::ListenOptions;
use telegrammer::{Error, InboundUpdate, Messenger, Result};

pub const RECIPIENT: i64 = 4242;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendText {
        recipient: i64,
        body: String,
    },
    SendDocument {
        recipient: i64,
        filename: String,
        content: Vec<u8>,
        caption: String,
    },
    RemoveWebhook,
    GetUpdates {
        offset: i64,
        timeout_secs: u32,
    },
}

#[derive(Default)]
pub struct MockMessenger {
    calls: Mutex<Vec<Call>>,
    batches: Mutex<VecDeque<Result<Vec<InboundUpdate>>>>,
    send_error: Option<String>,
    webhook_error: Option<String>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches returned by successive `get_updates` calls. Polling past the
    /// last batch panics, so a test fails instead of hanging.
    pub fn with_batches(self, batches: Vec<Result<Vec<InboundUpdate>>>) -> Self {
        *self.batches.lock().unwrap() = batches.into();
        self
    }

    pub fn failing_send(mut self, description: &str) -> Self {
        self.send_error = Some(description.to_string());
        self
    }

    pub fn failing_webhook(mut self, description: &str) -> Self {
        self.webhook_error = Some(description.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SendText { .. } | Call::SendDocument { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(&self, recipient: i64, body: &str) -> Result<()> {
        self.record(Call::SendText {
            recipient,
            body: body.to_string(),
        });
        match &self.send_error {
            Some(description) => Err(Error::Send(description.clone())),
            None => Ok(()),
        }
    }

    async fn send_document(
        &self,
        recipient: i64,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<()> {
        self.record(Call::SendDocument {
            recipient,
            filename: filename.to_string(),
            content,
            caption: caption.to_string(),
        });
        match &self.send_error {
            Some(description) => Err(Error::Send(description.clone())),
            None => Ok(()),
        }
    }

    async fn remove_webhook(&self) -> Result<()> {
        self.record(Call::RemoveWebhook);
        match &self.webhook_error {
            Some(description) => Err(Error::Webhook(description.clone())),
            None => Ok(()),
        }
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u32) -> Result<Vec<InboundUpdate>> {
        self.record(Call::GetUpdates {
            offset,
            timeout_secs,
        });
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("polled past the scripted batches (offset {offset})"))
    }
}

/// Listener options with no waiting, for tests.
pub fn fast_options() -> ListenOptions {
    ListenOptions {
        poll_timeout: 60,
        settle_delay: Duration::ZERO,
        retry_delay: Duration::ZERO,
    }
}

/// A private-chat text message payload as the Bot API shapes it.
pub fn text_message(chat_id: i64, text: &str) -> Value {
    json!({
        "message_id": 17,
        "date": 1_700_000_000,
        "chat": { "id": chat_id, "first_name": "Ann", "type": "private" },
        "from": { "id": chat_id, "is_bot": false, "first_name": "Ann" },
        "text": text
    })
}

pub fn message_update(id: i64, text: &str) -> InboundUpdate {
    InboundUpdate::new(id, Some(text_message(RECIPIENT, text)))
}

pub fn empty_update(id: i64) -> InboundUpdate {
    InboundUpdate::new(id, None)
}
