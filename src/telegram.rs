//! Telegram transport
//!
//! The pipeline only sees `(chat_id, content)` in and `send(chat_id, text)`
//! out; this module is the thin edge that maps Telegram update JSON to the
//! first and the Bot API to the second. Delivery is at-most-once: a failed
//! send is reported to the caller, never retried.

use crate::error::AssistantError;
use crate::models::{ChatId, IncomingMessage, MessageContent};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

/// Outbound reply capability.
#[async_trait]
pub trait MessagingService: Send + Sync {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

/// Extract what the pipeline consumes from an update payload.
///
/// Telegram nests the interesting parts under `message`; direct invocations
/// during testing may pass the message object itself. A payload without a
/// chat id is structurally invalid and yields `None`. Voice notes and
/// messages carrying neither text nor voice are flagged so the pipeline can
/// short-circuit with a fixed reply.
pub fn parse_update(update: &Value) -> Option<IncomingMessage> {
    let message = update.get("message").unwrap_or(update);

    let chat_id = message.get("chat")?.get("id")?.as_i64()?;

    let content = if message.get("voice").is_some() {
        MessageContent::Voice
    } else {
        match message.get("text").and_then(|t| t.as_str()) {
            Some(text) if !text.trim().is_empty() => MessageContent::Text(text.trim().to_string()),
            _ => MessageContent::Unsupported,
        }
    };

    Some(IncomingMessage {
        chat_id: ChatId(chat_id),
        content,
    })
}

/// Bot API client for `sendMessage` (connection-pooled).
pub struct TelegramSender {
    client: Client,
    base_url: String,
}

impl TelegramSender {
    pub fn new(bot_token: &str) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: format!("https://api.telegram.org/bot{}", bot_token),
        }
    }
}

#[async_trait]
impl MessagingService for TelegramSender {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let url = format!("{}/sendMessage", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id.0,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| {
                error!(chat = %chat_id, "Telegram request failed: {}", e);
                AssistantError::DeliveryError(format!("Telegram request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(chat = %chat_id, "Telegram rejected message: {}", body);
            return Err(AssistantError::DeliveryError(format!(
                "Telegram rejected message: {}",
                body
            )));
        }

        info!(chat = %chat_id, "Reply delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_update() {
        let update = json!({
            "update_id": 123456789,
            "message": {
                "chat": {"id": 6299753048i64},
                "text": "  ¿Cuánto gasté en agosto?  "
            }
        });

        let message = parse_update(&update).unwrap();
        assert_eq!(message.chat_id, ChatId(6299753048));
        assert_eq!(
            message.content,
            MessageContent::Text("¿Cuánto gasté en agosto?".to_string())
        );
    }

    #[test]
    fn test_parse_bare_message_object() {
        let update = json!({
            "chat": {"id": 42},
            "text": "hola"
        });

        let message = parse_update(&update).unwrap();
        assert_eq!(message.chat_id, ChatId(42));
    }

    #[test]
    fn test_voice_message_is_flagged() {
        let update = json!({
            "message": {
                "chat": {"id": 42},
                "voice": {"duration": 3, "file_id": "abc"}
            }
        });

        let message = parse_update(&update).unwrap();
        assert_eq!(message.content, MessageContent::Voice);
    }

    #[test]
    fn test_message_without_text_is_unsupported() {
        let update = json!({
            "message": {
                "chat": {"id": 42},
                "photo": [{"file_id": "abc"}]
            }
        });

        let message = parse_update(&update).unwrap();
        assert_eq!(message.content, MessageContent::Unsupported);
    }

    #[test]
    fn test_empty_text_is_unsupported() {
        let update = json!({
            "message": {
                "chat": {"id": 42},
                "text": "   "
            }
        });

        let message = parse_update(&update).unwrap();
        assert_eq!(message.content, MessageContent::Unsupported);
    }

    #[test]
    fn test_missing_chat_id_is_invalid() {
        let update = json!({
            "message": {"text": "hola"}
        });

        assert!(parse_update(&update).is_none());
    }
}
