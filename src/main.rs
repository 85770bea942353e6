//! USDT seller - Telegram bot for selling USDT for fiat
//!
//! Walks each user through a short guided sale and hands them a
//! CoinPayments deposit address at the end.

mod config;
mod processor;
mod runtime;
mod sale;
mod telegram;

use config::Config;
use processor::{CoinPaymentsService, LoggingProcessor};
use runtime::{InMemorySessionStore, ProductionRuntime};
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "usdt_seller=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    tracing::info!(
        admin_chat = %config.sale.admin_chat,
        min = config.sale.limits.min,
        max = config.sale.limits.max,
        api_url = %config.coinpayments.api_url,
        "Configuration loaded"
    );

    let telegram = Arc::new(TelegramClient::new(
        config.telegram_token.clone(),
        config.poll_timeout,
    )?);
    if let Err(e) = telegram.set_my_commands(&telegram::menu_commands()).await {
        tracing::warn!(error = %e, "Failed to register bot commands");
    }

    let processor = Arc::new(LoggingProcessor::new(CoinPaymentsService::new(
        config.coinpayments.clone(),
    )?));

    let (runtime, handle): (ProductionRuntime, _) = runtime::SaleRuntime::new(
        Arc::new(config.sale.clone()),
        Arc::new(InMemorySessionStore::new()),
        processor,
        telegram.clone(),
    );

    let shutdown = CancellationToken::new();
    let runtime_task = tokio::spawn(runtime.run(shutdown.clone()));
    let poller_task = tokio::spawn(telegram::poller::run(
        telegram,
        handle,
        config.poll_timeout,
        shutdown.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    shutdown.cancel();

    poller_task.await?;
    runtime_task.await?;

    Ok(())
}
