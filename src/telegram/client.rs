//! Telegram Bot API client

use super::types::{
    BotCommand, InlineKeyboardButton, InlineKeyboardMarkup, SendMessage, SentMessage,
    TelegramResponse, Update,
};
use crate::sale::{ChatId, Prompt, TextFormat};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Slack added to the long-poll timeout for the HTTP request itself
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram {method} failed: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

/// Telegram Bot API client
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: String, poll_timeout: Duration) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(poll_timeout + HTTP_TIMEOUT_SLACK)
            .build()?;
        Ok(Self {
            client,
            bot_token,
            base_url: TELEGRAM_API_BASE.to_string(),
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.bot_token)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp: TelegramResponse<T> = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        match (resp.ok, resp.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api {
                method,
                description: resp.description.unwrap_or_else(|| "unknown".into()),
            }),
        }
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", &body).await
    }

    pub async fn send_message(&self, chat_id: ChatId, prompt: &Prompt) -> Result<i64, TelegramError> {
        let body = SendMessage {
            chat_id: chat_id.0,
            text: &prompt.text,
            parse_mode: match prompt.format {
                TextFormat::Plain => None,
                TextFormat::Markdown => Some("Markdown"),
            },
            reply_markup: keyboard(prompt),
        };
        let sent: SentMessage = self.call("sendMessage", &body).await?;
        Ok(sent.message_id)
    }

    pub async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let body = serde_json::json!({
            "chat_id": chat_id.0,
            "photo": photo_url,
            "caption": caption,
        });
        let _: SentMessage = self.call("sendPhoto", &body).await?;
        Ok(())
    }

    /// Stop the button's loading spinner
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "callback_query_id": callback_query_id });
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// Register the persistent command menu
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let body = serde_json::json!({ "commands": commands });
        let _: bool = self.call("setMyCommands", &body).await?;
        Ok(())
    }
}

/// Inline keyboard for a prompt, or `None` when it expects free text
pub fn keyboard(prompt: &Prompt) -> Option<InlineKeyboardMarkup> {
    if prompt.choices.is_empty() {
        return None;
    }
    let inline_keyboard = prompt
        .choices
        .iter()
        .map(|row| {
            row.iter()
                .map(|choice| InlineKeyboardButton {
                    text: choice.label.clone(),
                    callback_data: choice.token.clone(),
                })
                .collect()
        })
        .collect();
    Some(InlineKeyboardMarkup { inline_keyboard })
}
