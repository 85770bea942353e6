//! Long-polling loop that turns Telegram updates into sale events

use super::client::TelegramClient;
use super::types::{BotCommand, Update, User};
use crate::runtime::{Inbound, RuntimeHandle};
use crate::sale::{ChatId, Event, UserProfile};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay before polling again after a failed `getUpdates`
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Commands shown in the bot's menu
pub fn menu_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("/start", "Restart the bot"),
        BotCommand::new("/sell", "Sell your USDT"),
        BotCommand::new("/cancel", "Cancel the current sale"),
    ]
}

/// A routed update: the event for the runtime plus the callback to acknowledge
#[derive(Debug)]
pub struct Routed {
    pub inbound: Option<Inbound>,
    pub callback_query_id: Option<String>,
}

/// Map one update to a sale event.
///
/// Unknown commands and non-text messages produce no event. Button presses
/// always carry a callback id so the spinner can be cleared even when the
/// press is ignored.
pub fn route(update: Update) -> Routed {
    if let Some(query) = update.callback_query {
        let inbound = match (query.message, query.data) {
            (Some(message), Some(token)) => Some(Inbound {
                chat_id: ChatId(message.chat.id),
                event: Event::Select { token },
            }),
            _ => None,
        };
        return Routed {
            inbound,
            callback_query_id: Some(query.id),
        };
    }

    let inbound = update.message.and_then(|message| {
        let text = message.text?;
        let chat_id = ChatId(message.chat.id);
        let event = match parse_command(&text) {
            Some("start") => Event::Welcome {
                profile: message.from.map(profile).unwrap_or_default(),
            },
            Some("sell") => Event::StartSale,
            Some("cancel") => Event::Cancel,
            Some(_) => return None,
            None => Event::Text { text },
        };
        Some(Inbound { chat_id, event })
    });

    Routed {
        inbound,
        callback_query_id: None,
    }
}

/// Command name without the slash or `@botname` suffix
fn parse_command(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    let word = rest.split_whitespace().next().unwrap_or("");
    Some(word.split('@').next().unwrap_or(word))
}

fn profile(user: User) -> UserProfile {
    UserProfile {
        user_id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        username: user.username,
    }
}

/// Poll until `shutdown` fires, forwarding events to the runtime
pub async fn run(
    client: Arc<TelegramClient>,
    runtime: RuntimeHandle,
    poll_timeout: Duration,
    shutdown: CancellationToken,
) {
    tracing::info!("Starting Telegram poller");
    let mut offset = 0_i64;

    loop {
        let updates = tokio::select! {
            () = shutdown.cancelled() => break,
            result = client.get_updates(offset, poll_timeout) => result,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, backing off");
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(ERROR_BACKOFF) => continue,
                }
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            let routed = route(update);

            if let Some(id) = routed.callback_query_id {
                if let Err(e) = client.answer_callback_query(&id).await {
                    tracing::warn!(error = %e, "Failed to answer callback query");
                }
            }

            match routed.inbound {
                Some(inbound) => {
                    tracing::debug!(
                        update_id,
                        chat_id = %inbound.chat_id,
                        event = inbound.event.kind(),
                        "Routing update"
                    );
                    if runtime.send(inbound).await.is_err() {
                        tracing::error!("Sale runtime stopped, shutting down poller");
                        return;
                    }
                }
                None => tracing::debug!(update_id, "Skipping update"),
            }
        }
    }

    tracing::info!("Telegram poller stopped");
}
