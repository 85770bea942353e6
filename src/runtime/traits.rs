//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::sale::{ChatId, Prompt, Session};
use crate::telegram::TelegramClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Keyed storage for in-progress sessions, one per chat
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Session>, String>;

    /// Insert or replace the session for a chat
    async fn put(&self, chat_id: ChatId, session: Session) -> Result<(), String>;

    /// Remove the session for a chat; missing sessions are not an error
    async fn delete(&self, chat_id: ChatId) -> Result<(), String>;
}

/// Outbound chat messages
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), String>;

    async fn send_photo(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Session>, String> {
        (**self).get(chat_id).await
    }

    async fn put(&self, chat_id: ChatId, session: Session) -> Result<(), String> {
        (**self).put(chat_id, session).await
    }

    async fn delete(&self, chat_id: ChatId) -> Result<(), String> {
        (**self).delete(chat_id).await
    }
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), String> {
        (**self).send_prompt(chat_id, prompt).await
    }

    async fn send_photo(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<(), String> {
        (**self).send_photo(chat_id, url, caption).await
    }
}

// ============================================================================
// Production adapters
// ============================================================================

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), String> {
        self.send_message(chat_id, prompt)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn send_photo(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<(), String> {
        TelegramClient::send_photo(self, chat_id, url, caption)
            .await
            .map_err(|e| e.to_string())
    }
}
