//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::executor::SaleRuntime;
use super::store::InMemorySessionStore;
use super::traits::{Messenger, SessionStore};
use super::Inbound;
use crate::processor::{DepositAddress, DepositRequest, PaymentProcessor, ProcessorError};
use crate::sale::state::Stage;
use crate::sale::{AmountLimits, ChatId, Event, Prompt, RateTable, SaleSettings, Session};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock Payment Processor
// ============================================================================

/// Mock processor that returns queued outcomes
#[derive(Default)]
pub struct MockProcessor {
    outcomes: Mutex<VecDeque<Result<DepositAddress, ProcessorError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<DepositRequest>>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_deposit(&self, deposit: DepositAddress) {
        self.outcomes.lock().unwrap().push_back(Ok(deposit));
    }

    pub fn queue_error(&self, error: ProcessorError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<DepositRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_transaction(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositAddress, ProcessorError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProcessorError::network("No mock outcome queued")))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ============================================================================
// Mock Messenger
// ============================================================================

/// A delivered message
#[derive(Debug, Clone)]
pub enum Sent {
    Prompt { chat_id: ChatId, prompt: Prompt },
    Photo {
        chat_id: ChatId,
        url: String,
        caption: String,
    },
}

impl Sent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Sent::Prompt { chat_id, .. } | Sent::Photo { chat_id, .. } => *chat_id,
        }
    }

    /// Text of a prompt; `None` for photos
    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Prompt { prompt, .. } => Some(&prompt.text),
            Sent::Photo { .. } => None,
        }
    }
}

/// Messenger that records deliveries, optionally failing or slowing them
#[derive(Default)]
pub struct MockMessenger {
    sent: Mutex<Vec<Sent>>,
    failing: AtomicBool,
    delays: Mutex<HashMap<ChatId, Duration>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later delivery fail
    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Make every later delivery to `chat_id` take `delay`
    pub fn delay_chat(&self, chat_id: ChatId, delay: Duration) {
        self.delays.lock().unwrap().insert(chat_id, delay);
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<Sent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.chat_id() == chat_id)
            .cloned()
            .collect()
    }

    async fn record(&self, sent: Sent) -> Result<(), String> {
        let delay = self.delays.lock().unwrap().get(&sent.chat_id()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err("chat unreachable".to_string());
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), String> {
        self.record(Sent::Prompt {
            chat_id,
            prompt: prompt.clone(),
        })
        .await
    }

    async fn send_photo(&self, chat_id: ChatId, url: &str, caption: &str) -> Result<(), String> {
        self.record(Sent::Photo {
            chat_id,
            url: url.to_string(),
            caption: caption.to_string(),
        })
        .await
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn test_settings() -> SaleSettings {
    SaleSettings {
        limits: AmountLimits::default(),
        rates: RateTable::default(),
        refund_email: "refunds@example.com".to_string(),
        admin_chat: ChatId(1),
    }
}

pub fn sample_deposit() -> DepositAddress {
    DepositAddress {
        amount: "100.00000000".to_string(),
        address: "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE".to_string(),
        txn_id: "CPFE0ABCDEF".to_string(),
        timeout_secs: 9000,
        qrcode_url: Some("https://www.coinpayments.net/qrgen.php?id=CPFE0ABCDEF".to_string()),
        status_url: None,
        expires_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

/// Runtime wired to mocks, stepped by hand from tests
pub struct TestRuntime {
    pub runtime: SaleRuntime<Arc<InMemorySessionStore>, MockProcessor, MockMessenger>,
    pub store: Arc<InMemorySessionStore>,
    pub processor: Arc<MockProcessor>,
    pub messenger: Arc<MockMessenger>,
    settings: Arc<SaleSettings>,
}

impl TestRuntime {
    pub fn new() -> Self {
        let settings = Arc::new(test_settings());
        let store = Arc::new(InMemorySessionStore::new());
        let processor = Arc::new(MockProcessor::new());
        let messenger = Arc::new(MockMessenger::new());
        let (runtime, _handle) = SaleRuntime::new(
            settings.clone(),
            store.clone(),
            processor.clone(),
            messenger.clone(),
        );
        Self {
            runtime,
            store,
            processor,
            messenger,
            settings,
        }
    }

    /// Process one user event immediately, bypassing the queue, and wait
    /// for its replies
    pub async fn send(&mut self, chat_id: ChatId, event: Event) {
        self.runtime
            .process(Inbound { chat_id, event })
            .await
            .unwrap();
        self.runtime.drain_deliveries().await;
    }

    pub async fn seed(&self, chat_id: ChatId, stage: Stage) {
        self.store.put(chat_id, Session { stage }).await.unwrap();
    }

    pub async fn session(&self, chat_id: ChatId) -> Option<Session> {
        self.store.get(chat_id).await.unwrap()
    }

    pub fn admin_chat(&self) -> ChatId {
        self.settings.admin_chat
    }
}
