//! Sale conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in and executes the effects that come out.

mod effect;
pub mod event;
pub mod prompts;
pub mod quote;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Prompt, TextFormat};
pub use event::{Event, UserProfile};
pub use quote::{AmountLimits, RateTable};
pub use state::{
    ChatId, FiatCurrency, Network, PaymentMethod, SaleContext, SaleSettings, Session,
};
pub use transition::{transition, SessionUpdate, Transition};
