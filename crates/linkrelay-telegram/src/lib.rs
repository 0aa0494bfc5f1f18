// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for linkrelay.
//!
//! Implements [`Transport`] over the Telegram Bot API via teloxide: long
//! polling for inbound messages and channel posts, plain sends, media
//! uploads, file downloads and native forwarding.

pub mod handler;
pub mod media;

use async_trait::async_trait;
use linkrelay_config::model::TelegramConfig;
use linkrelay_core::{
    AdapterType, HealthStatus, InboundMessage, MediaBlob, MessageId, PeerId, PluginAdapter,
    RelayError, Transport,
};
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const INBOUND_BUFFER: usize = 256;

/// Telegram transport implementing [`Transport`].
pub struct TelegramTransport {
    bot: Bot,
    inbound_rx: Mutex<mpsc::Receiver<InboundMessage>>,
    /// Moved into the polling task on connect, so the stream closes with it.
    inbound_tx: Option<mpsc::Sender<InboundMessage>>,
    polling_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramTransport {
    /// Creates a new Telegram transport.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, RelayError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RelayError::Config("telegram.bot_token is required for the Telegram transport".into())
        })?;

        if token.is_empty() {
            return Err(RelayError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let mut bot = Bot::new(token);
        if let Some(api_url) = config.api_url.as_deref() {
            let url = reqwest::Url::parse(api_url)
                .map_err(|e| RelayError::Config(format!("invalid telegram.api_url: {e}")))?;
            bot = bot.set_api_url(url);
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        Ok(Self {
            bot,
            inbound_rx: Mutex::new(inbound_rx),
            inbound_tx: Some(inbound_tx),
            polling_handle: Mutex::new(None),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn send_error(what: &str, e: teloxide::RequestError) -> RelayError {
    RelayError::transport(format!("failed to {what}: {e}"), e)
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        debug!("Telegram transport shutting down");
        if let Some(handle) = self.polling_handle.lock().await.take() {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn connect(&mut self) -> Result<(), RelayError> {
        let Some(tx) = self.inbound_tx.take() else {
            return Ok(()); // Already connected
        };

        let bot = self.bot.clone();
        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let messages_tx = tx.clone();
            let posts_tx = tx;
            let handler = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = messages_tx.clone();
                    async move {
                        forward_inbound(&tx, &msg).await;
                        respond(())
                    }
                }))
                .branch(Update::filter_channel_post().endpoint(move |msg: Message| {
                    let tx = posts_tx.clone();
                    async move {
                        forward_inbound(&tx, &msg).await;
                        respond(())
                    }
                }));

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore other updates
                .build()
                .dispatch()
                .await;
        });

        *self.polling_handle.lock().await = Some(handle);
        Ok(())
    }

    async fn send_text(&self, to: PeerId, text: &str) -> Result<MessageId, RelayError> {
        let sent = self
            .bot
            .send_message(ChatId(to.0), text)
            .await
            .map_err(|e| send_error("send message", e))?;
        Ok(MessageId(sent.id.0))
    }

    async fn send_media(
        &self,
        to: PeerId,
        media: MediaBlob,
        caption: &str,
    ) -> Result<MessageId, RelayError> {
        let sent = media::upload(&self.bot, ChatId(to.0), media, caption).await?;
        Ok(MessageId(sent.id.0))
    }

    async fn fetch_media(&self, message: &InboundMessage) -> Result<Vec<u8>, RelayError> {
        let attachment = message.attachment.as_ref().ok_or_else(|| RelayError::Media {
            message: format!("message {} has no attachment", message.id),
        })?;
        media::download_file(&self.bot, &attachment.file_id).await
    }

    async fn forward(
        &self,
        message: &InboundMessage,
        to: PeerId,
    ) -> Result<MessageId, RelayError> {
        let sent = self
            .bot
            .forward_message(
                ChatId(to.0),
                ChatId(message.chat.0),
                teloxide::types::MessageId(message.id.0),
            )
            .await
            .map_err(|e| send_error("forward message", e))?;
        Ok(MessageId(sent.id.0))
    }

    async fn receive(&self) -> Result<InboundMessage, RelayError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or(RelayError::TransportClosed)
    }
}

async fn forward_inbound(tx: &mpsc::Sender<InboundMessage>, msg: &Message) {
    let inbound = handler::to_inbound_message(msg);
    debug!(
        chat_id = msg.chat.id.0,
        message_id = msg.id.0,
        "inbound Telegram message"
    );
    if tx.send(inbound).await.is_err() {
        warn!("inbound channel closed, dropping message");
    }
}
