//! Deposit request and response types

use crate::sale::{ChatId, FiatCurrency, Network, PaymentMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request for a fresh deposit address
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRequest {
    /// Network/currency code the deposit is made in
    pub currency: Network,
    /// USDT amount, full precision
    pub amount: f64,
    /// Refund/contact email
    pub buyer_email: String,
    pub item_name: String,
    /// Echoed back by the processor's webhook to find the conversation
    pub custom: Correlation,
}

/// Opaque correlation payload, serialized as JSON into the `custom` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub telegram_chat_id: ChatId,
    pub payment_method: PaymentMethod,
    pub payment_details: String,
    pub fiat: FiatCurrency,
}

impl Correlation {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A generated deposit address
#[derive(Debug, Clone, PartialEq)]
pub struct DepositAddress {
    /// Exact amount to send, as confirmed by the processor
    pub amount: String,
    pub address: String,
    pub txn_id: String,
    /// How long the address stays valid
    pub timeout_secs: u64,
    pub qrcode_url: Option<String>,
    pub status_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl DepositAddress {
    /// Validity in hours, one decimal
    #[allow(clippy::cast_precision_loss)] // timeouts are a few days at most
    pub fn validity_hours(&self) -> String {
        format!("{:.1}", self.timeout_secs as f64 / 3600.0)
    }
}
