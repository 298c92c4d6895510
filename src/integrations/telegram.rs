//! Telegram Bot API client.
//!
//! Thin [`Messenger`] implementation over `teloxide::Bot`.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::payloads::{GetUpdatesSetters, SendDocumentSetters};
use teloxide::requests::Requester;
use teloxide::types::{ChatId, InputFile, Update, UpdateKind};
use teloxide::Bot;
use tracing::{debug, info};
use url::Url;

use crate::config::{env_key, KEY_BOT_KEY};
use crate::messenger::{InboundUpdate, Messenger};
use crate::{Error, Result};

/// Seconds the Bot API holds a `getUpdates` call open.
pub const DEFAULT_POLL_TIMEOUT: u32 = 60;

/// Added to the poll timeout for the HTTP request timeout.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Authorized Telegram bot.
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    /// Build a client without checking the token.
    pub fn new(bot_key: &str, api_url: Option<&str>, poll_timeout: u32) -> Result<Self> {
        if bot_key.trim().is_empty() {
            return Err(Error::Auth(format!(
                "bot key is empty (set `{}` in config.yaml or {})",
                KEY_BOT_KEY,
                env_key(KEY_BOT_KEY)
            )));
        }

        let http_timeout = Duration::from_secs(u64::from(poll_timeout)) + HTTP_TIMEOUT_MARGIN;
        let client = teloxide::net::default_reqwest_settings()
            .timeout(http_timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client error: {}", e)))?;

        let mut bot = Bot::with_client(bot_key, client);
        if let Some(api_url) = api_url {
            let url = Url::parse(api_url)
                .map_err(|e| Error::Config(format!("Invalid api_url {:?}: {}", api_url, e)))?;
            bot = bot.set_api_url(url);
        }

        Ok(Self { bot })
    }

    /// Build a client and verify the token with `getMe`.
    pub async fn connect(bot_key: &str, api_url: Option<&str>, poll_timeout: u32) -> Result<Self> {
        let messenger = Self::new(bot_key, api_url, poll_timeout)?;
        messenger.authorize().await?;
        Ok(messenger)
    }

    /// Check the token; returns the bot's username when it has one.
    pub async fn authorize(&self) -> Result<Option<String>> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;
        let username = me.user.username.clone();
        info!(
            bot = username.as_deref().unwrap_or("<no username>"),
            "Authorized on account"
        );
        Ok(username)
    }
}

/// Keep message updates as structured values; drop every other kind.
fn to_inbound(update: Update) -> InboundUpdate {
    let message = match update.kind {
        // A message that does not serialize becomes `null`, which the renderer rejects.
        UpdateKind::Message(message) => Some(serde_json::to_value(&message).unwrap_or_default()),
        _ => None,
    };
    InboundUpdate::new(i64::from(update.id), message)
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, recipient: i64, body: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(recipient), body)
            .await
            .map_err(|e| Error::Send(e.to_string()))?;
        Ok(())
    }

    async fn send_document(
        &self,
        recipient: i64,
        filename: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> Result<()> {
        let document = InputFile::memory(content).file_name(filename.to_string());
        let mut request = self.bot.send_document(ChatId(recipient), document);
        if !caption.is_empty() {
            request = request.caption(caption);
        }
        request.await.map_err(|e| Error::Send(e.to_string()))?;
        Ok(())
    }

    async fn remove_webhook(&self) -> Result<()> {
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| Error::Webhook(e.to_string()))?;
        Ok(())
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u32) -> Result<Vec<InboundUpdate>> {
        let offset = i32::try_from(offset)
            .map_err(|_| Error::Stream(format!("update offset out of range: {}", offset)))?;

        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout_secs)
            .await
            .map_err(|e| Error::Stream(e.to_string()))?;

        debug!(offset, count = updates.len(), "Received updates");
        Ok(updates.into_iter().map(to_inbound).collect())
    }
}
