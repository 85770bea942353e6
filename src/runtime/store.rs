//! In-memory session store
//!
//! Sessions live only as long as the process; a restart drops every
//! in-progress sale.

use super::traits::SessionStore;
use crate::sale::{ChatId, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<ChatId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chats with a sale in progress
    #[cfg(test)]
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Session>, String> {
        Ok(self.sessions.read().await.get(&chat_id).cloned())
    }

    async fn put(&self, chat_id: ChatId, session: Session) -> Result<(), String> {
        self.sessions.write().await.insert(chat_id, session);
        Ok(())
    }

    async fn delete(&self, chat_id: ChatId) -> Result<(), String> {
        self.sessions.write().await.remove(&chat_id);
        Ok(())
    }
}
