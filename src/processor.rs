//! Payment processor abstraction
//!
//! The processor turns a sale into a crypto deposit address.

mod coinpayments;
mod error;
mod types;

pub use coinpayments::{CoinPaymentsConfig, CoinPaymentsService, DEFAULT_API_URL};
pub use error::ProcessorError;
pub use types::{Correlation, DepositAddress, DepositRequest};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for payment processors
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a transaction and return the address the user deposits to
    async fn create_transaction(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositAddress, ProcessorError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: PaymentProcessor + ?Sized> PaymentProcessor for Arc<T> {
    async fn create_transaction(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositAddress, ProcessorError> {
        (**self).create_transaction(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Logging wrapper for payment processors
pub struct LoggingProcessor<P> {
    inner: P,
}

impl<P: PaymentProcessor> LoggingProcessor<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: PaymentProcessor> PaymentProcessor for LoggingProcessor<P> {
    async fn create_transaction(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositAddress, ProcessorError> {
        let start = std::time::Instant::now();
        let result = self.inner.create_transaction(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(deposit) => {
                tracing::info!(
                    processor = self.inner.name(),
                    chat_id = %request.custom.telegram_chat_id,
                    currency = %request.currency,
                    amount = request.amount,
                    txn_id = %deposit.txn_id,
                    duration_ms = %duration.as_millis(),
                    "Deposit address created"
                );
            }
            Err(e) => {
                tracing::error!(
                    processor = self.inner.name(),
                    chat_id = %request.custom.telegram_chat_id,
                    currency = %request.currency,
                    amount = request.amount,
                    kind = e.kind.as_str(),
                    error = %e.message,
                    duration_ms = %duration.as_millis(),
                    "Deposit address request failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
