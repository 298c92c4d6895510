//! Server mode: wait for the next message sent to the bot and print it.
//!
//! Used once while setting up, to read the chat id off a real message.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Settings;
use crate::display;
use crate::error::Result;
use crate::integrations::telegram::{TelegramMessenger, DEFAULT_POLL_TIMEOUT};
use crate::messenger::{InboundUpdate, Messenger};

/// Wait after removing the webhook before the first poll. Best effort only:
/// the Bot API gives no signal that the removal has propagated.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Wait before polling again after a failed poll.
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ListenOptions {
    pub poll_timeout: u32,
    pub settle_delay: Duration,
    pub retry_delay: Duration,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            settle_delay: SETTLE_DELAY,
            retry_delay: RETRY_DELAY,
        }
    }
}

/// The update that ended the listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Captured {
    pub update_id: i64,
    pub rendered: String,
}

/// Long-poll cursor over the bot's updates.
pub struct UpdateStream<'a, M: ?Sized> {
    messenger: &'a M,
    offset: i64,
    poll_timeout: u32,
    retry_delay: Duration,
    pending: VecDeque<InboundUpdate>,
}

impl<'a, M> UpdateStream<'a, M>
where
    M: Messenger + ?Sized,
{
    /// Open the stream at `offset`. The first poll happens here and its
    /// failure is returned; later failures are retried by [`Self::next`].
    pub async fn open(
        messenger: &'a M,
        offset: i64,
        poll_timeout: u32,
        retry_delay: Duration,
    ) -> Result<Self> {
        let mut stream = Self {
            messenger,
            offset,
            poll_timeout,
            retry_delay,
            pending: VecDeque::new(),
        };
        stream.poll().await?;
        Ok(stream)
    }

    async fn poll(&mut self) -> Result<()> {
        let batch = self
            .messenger
            .get_updates(self.offset, self.poll_timeout)
            .await?;
        if let Some(max_id) = batch.iter().map(|u| u.id).max() {
            self.offset = self.offset.max(max_id + 1);
        }
        self.pending.extend(batch);
        Ok(())
    }

    /// Next update in delivery order. Polls until one arrives.
    pub async fn next(&mut self) -> InboundUpdate {
        loop {
            if let Some(update) = self.pending.pop_front() {
                return update;
            }
            if let Err(err) = self.poll().await {
                warn!(
                    offset = self.offset,
                    "{}; retrying in {:?}", err, self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;
            }
        }
    }

    /// Offset the next poll will request.
    pub fn offset(&self) -> i64 {
        self.offset
    }
}

/// Remove the webhook, then poll until an update with a renderable message
/// arrives, write it to `sink` and return it.
pub async fn capture<M, W>(messenger: &M, options: &ListenOptions, sink: &mut W) -> Result<Captured>
where
    M: Messenger + ?Sized,
    W: Write,
{
    messenger.remove_webhook().await?;
    tokio::time::sleep(options.settle_delay).await;

    let mut updates =
        UpdateStream::open(messenger, 0, options.poll_timeout, options.retry_delay).await?;
    info!("Waiting for a message; send one to the bot (Ctrl-C to stop)");

    loop {
        let update = updates.next().await;
        match display::render_update(&update) {
            Ok(Some(rendered)) => {
                if let Err(err) = display::show(sink, &rendered) {
                    warn!("Failed to write update: {}", err);
                }
                info!(update_id = update.id, "Captured message");
                return Ok(Captured {
                    update_id: update.id,
                    rendered,
                });
            }
            Ok(None) => {}
            Err(err) if !err.is_fatal() => {
                warn!(update_id = update.id, "Skipping update: {}", err)
            }
            Err(err) => return Err(err),
        }
    }
}

/// CLI entry point
pub async fn run(settings: &Settings, options: &ListenOptions) -> Result<Captured> {
    let messenger = TelegramMessenger::connect(
        &settings.bot_key,
        settings.api_url.as_deref(),
        options.poll_timeout,
    )
    .await?;
    capture(&messenger, options, &mut io::stdout()).await
}
