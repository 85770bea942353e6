//! Pure state transition function
//!
//! Every `(stage, event)` pair maps to either a transition or `Ignored`.
//! Nothing here performs I/O; the runtime applies the session update and
//! executes the effects.

use super::effect::Effect;
use super::event::Event;
use super::prompts;
use super::quote::parse_amount;
use super::state::{FiatCurrency, Network, PaymentMethod, SaleContext, Session, Stage};
use crate::processor::{Correlation, DepositRequest};

/// What to do with the stored session after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Leave the stored session as it is
    Keep,
    /// Store this session, replacing any previous one
    Replace(Session),
    /// Remove the session
    Discard,
}

/// Result of a state transition
#[derive(Debug)]
pub enum Transition {
    /// The event does not apply to the current stage
    Ignored,
    Apply {
        update: SessionUpdate,
        effects: Vec<Effect>,
    },
}

impl Transition {
    fn apply(update: SessionUpdate) -> Self {
        Transition::Apply {
            update,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        if let Transition::Apply { effects, .. } = &mut self {
            effects.push(effect);
        }
        self
    }
}

#[cfg(test)]
impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Transition::Ignored)
    }

    pub fn effects(&self) -> &[Effect] {
        match self {
            Transition::Ignored => &[],
            Transition::Apply { effects, .. } => effects,
        }
    }

    pub fn update(&self) -> Option<&SessionUpdate> {
        match self {
            Transition::Ignored => None,
            Transition::Apply { update, .. } => Some(update),
        }
    }
}

/// Pure transition function
pub fn transition(session: Option<&Session>, ctx: &SaleContext<'_>, event: Event) -> Transition {
    // A session with a deposit request in flight only listens to the processor
    if session.is_some_and(Session::is_deposit_pending) && event.is_user_input() {
        return Transition::Ignored;
    }

    let settings = ctx.settings;
    let stage = session.map(|s| &s.stage);

    match (stage, event) {
        // ============================================================
        // Commands
        // ============================================================
        (_, Event::Welcome { profile }) => Transition::apply(SessionUpdate::Discard)
            .with_effect(Effect::NotifyAdmin {
                text: prompts::admin_alert(&profile),
            })
            .with_effect(Effect::Reply(prompts::welcome(&profile))),

        (_, Event::StartSale) => Transition::apply(SessionUpdate::Replace(Session::new()))
            .with_effect(Effect::Reply(prompts::rate_board(&settings.rates)))
            .with_effect(Effect::Reply(prompts::fiat_choice())),

        (Some(_), Event::Cancel) => Transition::apply(SessionUpdate::Discard)
            .with_effect(Effect::Reply(prompts::cancelled())),

        // ============================================================
        // Selections
        // ============================================================
        (Some(Stage::AwaitingFiat), Event::Select { token }) => {
            match FiatCurrency::from_token(&token) {
                Some(fiat) => advance(Stage::AwaitingNetwork { fiat })
                    .with_effect(Effect::Reply(prompts::network_choice())),
                None => Transition::Ignored,
            }
        }

        (Some(Stage::AwaitingNetwork { fiat }), Event::Select { token }) => {
            match Network::from_token(&token) {
                Some(network) => advance(Stage::AwaitingAmount {
                    fiat: *fiat,
                    network,
                })
                .with_effect(Effect::Reply(prompts::amount_request(&settings.limits))),
                None => Transition::Ignored,
            }
        }

        (Some(Stage::AwaitingPaymentMethod { fiat, network, amount }), Event::Select { token }) => {
            match PaymentMethod::from_token(&token) {
                Some(method) => advance(Stage::AwaitingPaymentDetails {
                    fiat: *fiat,
                    network: *network,
                    amount: *amount,
                    method,
                    details: None,
                })
                .with_effect(Effect::Reply(prompts::payment_details_request(method))),
                None => Transition::Ignored,
            }
        }

        // ============================================================
        // Free text
        // ============================================================
        (Some(Stage::AwaitingAmount { fiat, network }), Event::Text { text }) => {
            match parse_amount(&text, &settings.limits) {
                Ok(amount) => {
                    let payout = settings.rates.quote(amount, *fiat);
                    advance(Stage::AwaitingPaymentMethod {
                        fiat: *fiat,
                        network: *network,
                        amount,
                    })
                    .with_effect(Effect::Reply(prompts::quote(payout, *fiat)))
                    .with_effect(Effect::Reply(prompts::payment_method_choice()))
                }
                Err(_) => Transition::apply(SessionUpdate::Keep)
                    .with_effect(Effect::Reply(prompts::invalid_amount(&settings.limits))),
            }
        }

        (
            Some(Stage::AwaitingPaymentDetails {
                fiat,
                network,
                amount,
                method,
                details: None,
            }),
            Event::Text { text },
        ) => {
            let request = DepositRequest {
                currency: *network,
                amount: *amount,
                buyer_email: settings.refund_email.clone(),
                item_name: format!("Sell {amount} {network}"),
                custom: Correlation {
                    telegram_chat_id: ctx.chat_id,
                    payment_method: *method,
                    payment_details: text.clone(),
                    fiat: *fiat,
                },
            };
            advance(Stage::AwaitingPaymentDetails {
                fiat: *fiat,
                network: *network,
                amount: *amount,
                method: *method,
                details: Some(text),
            })
            .with_effect(Effect::Reply(prompts::generating_address()))
            .with_effect(Effect::RequestDeposit(request))
        }

        // ============================================================
        // Processor outcomes (only while the request is in flight)
        // ============================================================
        (
            Some(Stage::AwaitingPaymentDetails {
                network,
                details: Some(_),
                ..
            }),
            Event::DepositCreated { deposit },
        ) => {
            let mut result = Transition::apply(SessionUpdate::Discard)
                .with_effect(Effect::Reply(prompts::deposit_instructions(&deposit, *network)));
            if let Some(url) = deposit.qrcode_url {
                result = result.with_effect(Effect::SendPhoto {
                    url,
                    caption: prompts::QR_CAPTION.to_string(),
                });
            }
            result
        }

        (Some(Stage::AwaitingPaymentDetails { details: Some(_), .. }), Event::DepositFailed { .. }) => {
            Transition::apply(SessionUpdate::Discard)
                .with_effect(Effect::Reply(prompts::deposit_failed()))
        }

        // ============================================================
        // Everything else: wrong stage, unknown token, no session
        // ============================================================
        (None, Event::Cancel | Event::Select { .. } | Event::Text { .. })
        | (None, Event::DepositCreated { .. } | Event::DepositFailed { .. })
        | (Some(_), Event::Select { .. } | Event::Text { .. })
        | (Some(_), Event::DepositCreated { .. } | Event::DepositFailed { .. }) => {
            Transition::Ignored
        }
    }
}

fn advance(stage: Stage) -> Transition {
    Transition::apply(SessionUpdate::Replace(Session { stage }))
}
