//! Telegram chat transport
//!
//! Uses the Telegram Bot API (https://core.telegram.org/bots/api) with
//! long polling.

mod client;
pub mod poller;
mod types;

pub use client::TelegramClient;
pub use poller::menu_commands;
