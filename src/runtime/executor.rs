//! Sale runtime executor

use super::traits::{Messenger, SessionStore};
use super::{Inbound, RuntimeHandle};
use crate::processor::{DepositRequest, PaymentProcessor};
use crate::sale::{
    transition, ChatId, Effect, Event, Prompt, SaleContext, SaleSettings, SessionUpdate, Transition,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the inbound event queue
const EVENT_QUEUE_DEPTH: usize = 256;

/// A message waiting to be delivered
enum Outgoing {
    Prompt {
        to: ChatId,
        prompt: Prompt,
    },
    Photo {
        to: ChatId,
        url: String,
        caption: String,
    },
}

/// Single event loop driving every chat's session.
///
/// Events are processed one at a time, so a chat's stored session is never
/// read and written concurrently. Message delivery runs in background tasks
/// chained per chat: replies to one chat stay in order, and a slow chat does
/// not hold up the others. Processor calls also run in the background and
/// report back through the event queue.
pub struct SaleRuntime<S, P, M>
where
    S: SessionStore + 'static,
    P: PaymentProcessor + 'static,
    M: Messenger + 'static,
{
    settings: Arc<SaleSettings>,
    store: S,
    processor: Arc<P>,
    messenger: Arc<M>,
    event_rx: mpsc::Receiver<Inbound>,
    event_tx: mpsc::Sender<Inbound>,
    /// Latest delivery task per originating chat
    deliveries: HashMap<ChatId, JoinHandle<()>>,
}

impl<S, P, M> SaleRuntime<S, P, M>
where
    S: SessionStore + 'static,
    P: PaymentProcessor + 'static,
    M: Messenger + 'static,
{
    pub fn new(
        settings: Arc<SaleSettings>,
        store: S,
        processor: Arc<P>,
        messenger: Arc<M>,
    ) -> (Self, RuntimeHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = RuntimeHandle {
            tx: event_tx.clone(),
        };
        let runtime = Self {
            settings,
            store,
            processor,
            messenger,
            event_rx,
            event_tx,
            deliveries: HashMap::new(),
        };
        (runtime, handle)
    }

    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Starting sale runtime");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                Some(inbound) = self.event_rx.recv() => {
                    if let Err(e) = self.process(inbound).await {
                        tracing::error!(error = %e, "Error handling event");
                    }
                }
                else => break,
            }
        }

        self.drain_deliveries().await;
        tracing::info!("Sale runtime stopped");
    }

    /// Handle one event: transition, persist, then execute effects
    pub(super) async fn process(&mut self, inbound: Inbound) -> Result<(), String> {
        let Inbound { chat_id, event } = inbound;
        let event_kind = event.kind();

        if let Event::DepositFailed { message } = &event {
            tracing::warn!(chat_id = %chat_id, error = %message, "Deposit request failed");
        }

        let session = self.store.get(chat_id).await?;
        let ctx = SaleContext::new(chat_id, &self.settings);
        let from = session.as_ref().map(|s| s.stage.kind());

        let result = transition(session.as_ref(), &ctx, event);
        let Transition::Apply { update, effects } = result else {
            tracing::debug!(
                chat_id = %chat_id,
                event = event_kind,
                stage = from.map_or("none", |k| k.as_str()),
                "Event ignored"
            );
            return Ok(());
        };

        // Persist before any side effect so a concurrent outcome sees the new stage
        match update {
            SessionUpdate::Keep => {}
            SessionUpdate::Replace(next) => {
                tracing::info!(
                    chat_id = %chat_id,
                    event = event_kind,
                    from = from.map_or("none", |k| k.as_str()),
                    to = %next.stage.kind(),
                    "Session advanced"
                );
                self.store.put(chat_id, next).await?;
            }
            SessionUpdate::Discard => {
                if session.is_some() {
                    tracing::info!(chat_id = %chat_id, event = event_kind, "Session closed");
                }
                self.store.delete(chat_id).await?;
            }
        }

        let mut outgoing = Vec::new();
        for effect in effects {
            match effect {
                Effect::Reply(prompt) => outgoing.push(Outgoing::Prompt {
                    to: chat_id,
                    prompt,
                }),
                Effect::SendPhoto { url, caption } => outgoing.push(Outgoing::Photo {
                    to: chat_id,
                    url,
                    caption,
                }),
                Effect::NotifyAdmin { text } => outgoing.push(Outgoing::Prompt {
                    to: self.settings.admin_chat,
                    prompt: Prompt::plain(text),
                }),
                Effect::RequestDeposit(request) => self.spawn_deposit_request(chat_id, request),
            }
        }
        self.deliver(chat_id, outgoing);

        Ok(())
    }

    /// Send messages in the background, after any still in flight for the same chat
    fn deliver(&mut self, chat_id: ChatId, outgoing: Vec<Outgoing>) {
        self.deliveries.retain(|_, task| !task.is_finished());
        if outgoing.is_empty() {
            return;
        }

        let previous = self.deliveries.remove(&chat_id);
        let messenger = self.messenger.clone();
        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            for message in outgoing {
                send_one(messenger.as_ref(), message).await;
            }
        });
        self.deliveries.insert(chat_id, task);
    }

    /// Wait for every queued delivery to finish
    pub(super) async fn drain_deliveries(&mut self) {
        for (_, task) in self.deliveries.drain() {
            let _ = task.await;
        }
    }

    /// Call the processor in the background and feed the outcome back as an event
    fn spawn_deposit_request(&self, chat_id: ChatId, request: DepositRequest) {
        let processor = self.processor.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let event = match processor.create_transaction(&request).await {
                Ok(deposit) => Event::DepositCreated { deposit },
                Err(e) => Event::DepositFailed { message: e.message },
            };
            if event_tx.send(Inbound { chat_id, event }).await.is_err() {
                tracing::warn!(chat_id = %chat_id, "Runtime gone before deposit outcome arrived");
            }
        });
    }

    /// Process the next queued event and wait for its replies, for tests that
    /// step the loop by hand
    #[cfg(test)]
    pub async fn process_next(&mut self) -> bool {
        let Some(inbound) = self.event_rx.recv().await else {
            return false;
        };
        let ok = self.process(inbound).await.is_ok();
        self.drain_deliveries().await;
        ok
    }
}

/// Delivery failures are logged and never touch session state
async fn send_one<M: Messenger>(messenger: &M, message: Outgoing) {
    match message {
        Outgoing::Prompt { to, prompt } => {
            if let Err(e) = messenger.send_prompt(to, &prompt).await {
                tracing::warn!(chat_id = %to, error = %e, "Failed to deliver message");
            }
        }
        Outgoing::Photo { to, url, caption } => {
            if let Err(e) = messenger.send_photo(to, &url, &caption).await {
                tracing::warn!(chat_id = %to, error = %e, "Failed to deliver photo");
            }
        }
    }
}
