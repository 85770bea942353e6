//! Runtime for executing sale conversations
//!
//! Owns the session store and applies [`crate::sale::transition`] results:
//! session updates first, then effects. Processor calls run in the
//! background and return as events.

mod executor;
mod store;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SaleRuntime;
pub use store::InMemorySessionStore;

use crate::processor::{CoinPaymentsService, LoggingProcessor};
use crate::sale::{ChatId, Event};
use crate::telegram::TelegramClient;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = SaleRuntime<
    Arc<InMemorySessionStore>,
    LoggingProcessor<CoinPaymentsService>,
    TelegramClient,
>;

/// An event addressed to one chat's session
#[derive(Debug)]
pub struct Inbound {
    pub chat_id: ChatId,
    pub event: Event,
}

/// Sending side of the runtime's event queue
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<Inbound>,
}

impl RuntimeHandle {
    /// Queue an event; fails only when the runtime has stopped
    pub async fn send(&self, inbound: Inbound) -> Result<(), String> {
        self.tx
            .send(inbound)
            .await
            .map_err(|_| "sale runtime stopped".to_string())
    }
}
