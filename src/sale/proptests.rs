//! Property-based tests for the sale state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::processor::DepositAddress;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_settings() -> SaleSettings {
    SaleSettings {
        limits: AmountLimits::default(),
        rates: RateTable::default(),
        refund_email: "refunds@example.com".to_string(),
        admin_chat: ChatId(1),
    }
}

fn step(settings: &SaleSettings, session: Option<&Session>, event: Event) -> Transition {
    transition(session, &SaleContext::new(ChatId(99), settings), event)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_fiat() -> impl Strategy<Value = FiatCurrency> {
    prop::sample::select(FiatCurrency::ALL.to_vec())
}

fn arb_network() -> impl Strategy<Value = Network> {
    prop::sample::select(Network::ALL.to_vec())
}

fn arb_method() -> impl Strategy<Value = PaymentMethod> {
    prop::sample::select(PaymentMethod::ALL.to_vec())
}

fn arb_valid_amount() -> impl Strategy<Value = f64> {
    25.0f64..=50_000.0
}

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::AwaitingFiat),
        arb_fiat().prop_map(|fiat| Stage::AwaitingNetwork { fiat }),
        (arb_fiat(), arb_network())
            .prop_map(|(fiat, network)| Stage::AwaitingAmount { fiat, network }),
        (arb_fiat(), arb_network(), arb_valid_amount()).prop_map(|(fiat, network, amount)| {
            Stage::AwaitingPaymentMethod {
                fiat,
                network,
                amount,
            }
        }),
        (
            arb_fiat(),
            arb_network(),
            arb_valid_amount(),
            arb_method(),
            proptest::option::of("[a-zA-Z0-9@. ]{1,20}")
        )
            .prop_map(|(fiat, network, amount, method, details)| {
                Stage::AwaitingPaymentDetails {
                    fiat,
                    network,
                    amount,
                    method,
                    details,
                }
            }),
    ]
}

/// Tokens valid at some stage
fn arb_known_token() -> impl Strategy<Value = String> {
    let tokens: Vec<String> = FiatCurrency::ALL
        .iter()
        .map(|f| f.token().to_string())
        .chain(Network::ALL.iter().map(|n| n.code().to_string()))
        .chain(PaymentMethod::ALL.iter().map(|m| m.token().to_string()))
        .collect();
    prop::sample::select(tokens)
}

fn is_known_token(token: &str) -> bool {
    FiatCurrency::from_token(token).is_some()
        || Network::from_token(token).is_some()
        || PaymentMethod::from_token(token).is_some()
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::StartSale),
        Just(Event::Cancel),
        arb_known_token().prop_map(|token| Event::Select { token }),
        "[a-z.]{1,12}".prop_map(|token| Event::Select { token }),
        "[0-9]{1,6}(\\.[0-9]{1,2})?".prop_map(|text| Event::Text { text }),
        "[a-zA-Z ]{1,20}".prop_map(|text| Event::Text { text }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_user_event(),
        1 => Just(Event::DepositFailed { message: "boom".to_string() }),
        1 => Just(Event::DepositCreated {
            deposit: DepositAddress {
                amount: "30".to_string(),
                address: "T123".to_string(),
                txn_id: "TX".to_string(),
                timeout_secs: 3600,
                qrcode_url: None,
                status_url: None,
                expires_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            },
        }),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Every amount inside the inclusive bounds is accepted
    #[test]
    fn prop_amount_in_bounds_accepted(
        fiat in arb_fiat(),
        network in arb_network(),
        amount in arb_valid_amount()
    ) {
        let settings = test_settings();
        let session = Session { stage: Stage::AwaitingAmount { fiat, network } };
        let result = step(&settings, Some(&session), Event::Text { text: amount.to_string() });

        match result.update() {
            Some(SessionUpdate::Replace(next)) => {
                prop_assert_eq!(next.stage.kind(), StageKind::AwaitingPaymentMethod);
                prop_assert_eq!(next.amount(), Some(amount));
            }
            other => prop_assert!(false, "expected Replace, got {:?}", other),
        }
    }

    // Every amount outside the bounds is rejected and the stage stays put
    #[test]
    fn prop_amount_out_of_bounds_rejected(
        amount in prop_oneof![0.0f64..24.999, 50_000.001f64..1e9]
    ) {
        let settings = test_settings();
        let session = Session {
            stage: Stage::AwaitingAmount { fiat: FiatCurrency::Usd, network: Network::Trc20 },
        };
        let result = step(&settings, Some(&session), Event::Text { text: amount.to_string() });
        prop_assert_eq!(result.update(), Some(&SessionUpdate::Keep));
        prop_assert_eq!(result.effects().len(), 1);
    }

    // Non-numeric text never advances the amount stage
    #[test]
    fn prop_non_numeric_amount_rejected(text in "[a-zA-Z ,]{0,12}") {
        let settings = test_settings();
        let session = Session {
            stage: Stage::AwaitingAmount { fiat: FiatCurrency::Eur, network: Network::Erc20 },
        };
        let result = step(&settings, Some(&session), Event::Text { text });
        prop_assert_eq!(result.update(), Some(&SessionUpdate::Keep));
    }

    // Stages only move forward one step at a time, or restart from the top
    #[test]
    fn prop_stage_never_skips(events in proptest::collection::vec(arb_event(), 0..30)) {
        let settings = test_settings();
        let mut session: Option<Session> = None;

        for event in events {
            let restarting = matches!(event, Event::StartSale);
            let before = session.as_ref().map(|s| s.stage.kind());
            let result = step(&settings, session.as_ref(), event);

            match result {
                Transition::Ignored => {}
                Transition::Apply { update, .. } => match update {
                    SessionUpdate::Keep => {}
                    SessionUpdate::Discard => session = None,
                    SessionUpdate::Replace(next) => {
                        let after = next.stage.kind();
                        if restarting {
                            prop_assert_eq!(after, StageKind::AwaitingFiat);
                        } else {
                            let before = before.expect("replace without a session");
                            let forward = (after as u8).wrapping_sub(before as u8);
                            prop_assert!(
                                forward <= 1,
                                "skipped from {:?} to {:?}", before, after
                            );
                        }
                        session = Some(next);
                    }
                },
            }
        }
    }

    // Restarting from any stage leaves no answers behind
    #[test]
    fn prop_restart_clears_fields(stage in arb_stage()) {
        let settings = test_settings();
        let session = Session { stage };
        let pending = session.is_deposit_pending();
        let result = step(&settings, Some(&session), Event::StartSale);

        if pending {
            prop_assert!(result.is_ignored());
        } else {
            prop_assert_eq!(result.update(), Some(&SessionUpdate::Replace(Session::new())));
        }
    }

    // A token not valid for the current stage changes nothing and says nothing
    #[test]
    fn prop_invalid_token_is_silent(stage in arb_stage(), token in "[a-zA-Z.]{0,12}") {
        prop_assume!(!is_known_token(&token));
        let settings = test_settings();
        let session = Session { stage };
        let result = step(&settings, Some(&session), Event::Select { token });
        prop_assert!(result.is_ignored());
        prop_assert!(result.effects().is_empty());
    }

    // The quote follows the rate table; the bounds do not
    #[test]
    fn prop_quote_tracks_rate(
        fiat in arb_fiat(),
        amount in arb_valid_amount(),
        rate in 0.01f64..10.0
    ) {
        let mut settings = test_settings();
        settings.rates = settings.rates.with_rate(fiat, rate);
        let session = Session { stage: Stage::AwaitingAmount { fiat, network: Network::Trc20 } };
        let result = step(&settings, Some(&session), Event::Text { text: amount.to_string() });

        prop_assert!(matches!(result.update(), Some(SessionUpdate::Replace(_))));
        let quote = result.effects()[0].prompt().expect("quote prompt");
        let expected = format!("{:.2} {}", amount * rate, fiat);
        prop_assert!(quote.text.contains(&expected), "{} missing {}", quote.text, expected);
    }
}
