// src/services/notify.rs

//! Notification delivery.
//!
//! Two transports, selected by configuration: Bark (form POST to a
//! per-user key endpoint) and Telegram (bot API `sendMessage`). Both
//! report success as a plain boolean; a failed delivery is logged and
//! never retried within the run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Config, PushConfig, PushMethod};
use crate::error::Result;
use crate::utils::http;

const PUSH_USER_AGENT: &str = concat!("appwatch/", env!("CARGO_PKG_VERSION"));

/// Bark notification group, shown as the collapsed bundle name on device.
const BARK_GROUP: &str = "appwatch";

/// One outgoing notification.
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Optional click-through link.
    pub url: String,
    /// Optional icon image URL.
    pub icon: String,
}

/// A delivery transport.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver one notification, reporting success.
    async fn send(&self, note: &Notification) -> bool;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}

/// Select the configured transport.
pub fn from_config(config: &Config) -> Result<Box<dyn NotificationSender>> {
    match config.push.method {
        PushMethod::Bark => Ok(Box::new(BarkSender::new(&config.push)?)),
        PushMethod::Telegram => Ok(Box::new(TelegramSender::new(&config.push)?)),
    }
}

/// Sender for the Bark push service.
pub struct BarkSender {
    endpoint: String,
    key: String,
    client: reqwest::Client,
}

impl BarkSender {
    pub fn new(config: &PushConfig) -> Result<Self> {
        Ok(Self {
            endpoint: config.bark_endpoint.trim_end_matches('/').to_string(),
            key: config.bark_key.clone(),
            client: http::create_client(PUSH_USER_AGENT, config.timeout_secs)?,
        })
    }

    fn form(note: &Notification) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("title", note.title.as_str()),
            ("body", note.body.as_str()),
            ("group", BARK_GROUP),
            ("sound", "bell"),
            ("isArchive", "1"),
        ];
        if !note.url.is_empty() {
            pairs.push(("url", note.url.as_str()));
        }
        if !note.icon.is_empty() {
            pairs.push(("icon", note.icon.as_str()));
        }
        pairs
    }
}

#[async_trait]
impl NotificationSender for BarkSender {
    async fn send(&self, note: &Notification) -> bool {
        if self.key.is_empty() {
            log::warn!("Skipping push: bark_key is not configured");
            return false;
        }

        let url = format!("{}/{}", self.endpoint, self.key);
        match self.client.post(&url).form(&Self::form(note)).send().await {
            Ok(response) => {
                let success = response.status().is_success();
                if success {
                    log::info!("Bark push delivered");
                } else {
                    log::error!("Bark push rejected: HTTP {}", response.status());
                }
                success
            }
            Err(e) => {
                log::error!("Bark push failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "bark"
    }
}

#[derive(Serialize)]
struct TelegramPayload<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct TelegramReply {
    #[serde(default)]
    ok: bool,
}

/// Sender for the Telegram bot API.
pub struct TelegramSender {
    api: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramSender {
    pub fn new(config: &PushConfig) -> Result<Self> {
        Ok(Self {
            api: config.telegram_api.clone(),
            bot_token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
            client: http::create_client(PUSH_USER_AGENT, config.timeout_secs)?,
        })
    }

    fn message_text(note: &Notification) -> String {
        format!("*{}*\n\n{}", note.title, note.body)
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send(&self, note: &Notification) -> bool {
        if self.bot_token.is_empty() || self.chat_id.is_empty() {
            log::warn!("Skipping push: telegram bot token or chat id is not configured");
            return false;
        }

        let url = format!("{}{}/sendMessage", self.api, self.bot_token);
        let payload = TelegramPayload {
            chat_id: &self.chat_id,
            text: Self::message_text(note),
            parse_mode: "Markdown",
            disable_web_page_preview: false,
        };

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) => match response.json::<TelegramReply>().await {
                Ok(reply) => {
                    if reply.ok {
                        log::info!("Telegram push delivered");
                    } else {
                        log::error!("Telegram push rejected by API");
                    }
                    reply.ok
                }
                Err(e) => {
                    log::error!("Telegram reply unreadable: {}", e);
                    false
                }
            },
            Err(e) => {
                log::error!("Telegram push failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
