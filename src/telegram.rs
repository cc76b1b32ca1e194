//! Telegram Bot API client
//!
//! Hand-rolled REST client over a shared `reqwest::Client`. The dispatcher
//! talks to it through the [`ChatApi`] trait so tests can substitute a
//! recording mock.

mod types;

pub use types::{CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram api error ({status}): {description}")]
    Api { status: u16, description: String },
    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outbound messaging operations the dispatcher needs. Each call may fail
/// independently of the others.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError>;

    /// Replace the photo card an inline keyboard was attached to.
    async fn edit_message_photo(
        &self,
        chat_id: i64,
        message_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError>;

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError>;

    /// Show the "typing…" indicator while a slow backend call is in flight.
    async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError>;
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    /// Register the webhook this server handles updates on.
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        self.call(
            "setWebhook",
            &json!({
                "url": url,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    async fn call(&self, method: &str, body: &Value) -> Result<(), TelegramError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let description = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v["description"].as_str().map(String::from))
            .unwrap_or_else(|| "no description".to_string());
        Err(TelegramError::Api {
            status: status.as_u16(),
            description,
        })
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)?;
        }
        self.call("sendMessage", &body).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "photo": photo_url,
            "caption": caption,
            "parse_mode": "Markdown",
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)?;
        }
        self.call("sendPhoto", &body).await
    }

    async fn edit_message_photo(
        &self,
        chat_id: i64,
        message_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "media": {
                "type": "photo",
                "media": photo_url,
                "caption": caption,
                "parse_mode": "Markdown",
            },
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)?;
        }
        self.call("editMessageMedia", &body).await
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        self.call(
            "answerCallbackQuery",
            &json!({ "callback_query_id": callback_query_id }),
        )
        .await
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), TelegramError> {
        self.call(
            "sendChatAction",
            &json!({ "chat_id": chat_id, "action": "typing" }),
        )
        .await
    }
}
