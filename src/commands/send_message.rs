//! Send a text message or a file to the configured chat

use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::config::{env_key, Settings, KEY_USER_ID};
use crate::display;
use crate::error::{Error, Result};
use crate::integrations::telegram::{TelegramMessenger, DEFAULT_POLL_TIMEOUT};
use crate::messenger::Messenger;

/// What a single invocation delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text {
        body: String,
    },
    Document {
        caption: String,
        filename: String,
        content: Vec<u8>,
    },
}

impl OutboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Text { .. } => "text",
            OutboundMessage::Document { .. } => "document",
        }
    }
}

/// A file read into memory, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub async fn read(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| Error::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            filename: file_name(path),
            content,
        })
    }
}

/// Base name of `path`, or the whole path when it has none (e.g. `..`).
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Build the message: a document captioned with `text` when a file is
/// attached, plain `text` otherwise.
pub fn compose(text: &str, attachment: Option<Attachment>) -> OutboundMessage {
    match attachment {
        Some(Attachment { filename, content }) => OutboundMessage::Document {
            caption: text.to_string(),
            filename,
            content,
        },
        None => OutboundMessage::Text {
            body: text.to_string(),
        },
    }
}

/// Read the configured attachment, if any, and compose the message.
pub async fn prepare(settings: &Settings, text: &str) -> Result<OutboundMessage> {
    let attachment = match &settings.file {
        Some(path) => Some(Attachment::read(path).await?),
        None => None,
    };
    Ok(compose(text, attachment))
}

/// Hand `message` to the messenger. Exactly one send call, no retries.
pub async fn dispatch<M>(messenger: &M, recipient: i64, message: OutboundMessage) -> Result<()>
where
    M: Messenger + ?Sized,
{
    info!(recipient, kind = message.kind(), "Sending message");
    match message {
        OutboundMessage::Text { body } => messenger.send_text(recipient, &body).await,
        OutboundMessage::Document {
            caption,
            filename,
            content,
        } => {
            messenger
                .send_document(recipient, &filename, content, &caption)
                .await
        }
    }
}

/// Dispatch `message`, then write the confirmation line to `sink`.
/// Nothing is written when the send fails.
pub async fn send<M, W>(messenger: &M, recipient: i64, message: OutboundMessage, sink: &mut W) -> Result<()>
where
    M: Messenger + ?Sized,
    W: Write,
{
    dispatch(messenger, recipient, message).await?;

    if let Err(err) = display::show(sink, &display::success_line()) {
        warn!("Failed to write confirmation: {}", err);
    }
    Ok(())
}

/// CLI entry point
pub async fn run(settings: &Settings, text: &str) -> Result<()> {
    // Read the attachment before connecting so a bad path costs no network calls.
    let message = prepare(settings, text).await?;

    if settings.user_id == 0 {
        warn!(
            "No recipient configured (set `{}` in config.yaml or {}); run with --server to find it",
            KEY_USER_ID,
            env_key(KEY_USER_ID)
        );
    }

    let messenger = TelegramMessenger::connect(
        &settings.bot_key,
        settings.api_url.as_deref(),
        DEFAULT_POLL_TIMEOUT,
    )
    .await?;
    send(&messenger, settings.user_id, message, &mut io::stdout()).await
}
