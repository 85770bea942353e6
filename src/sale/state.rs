//! Sale session types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Chat identifier the session is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Choice enumerations
// ============================================================================

/// Fiat currency the user is paid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    Usd,
    Eur,
    Gbp,
}

impl FiatCurrency {
    pub const ALL: [FiatCurrency; 3] = [Self::Usd, Self::Eur, Self::Gbp];

    /// Stable callback token, also the ISO code
    pub fn token(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Usd => "🇺🇸 USD",
            Self::Eur => "🇪🇺 EUR",
            Self::Gbp => "🇬🇧 GBP",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Blockchain network the USDT deposit is made on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "USDT.TRC20")]
    Trc20,
    #[serde(rename = "USDT.ERC20")]
    Erc20,
}

impl Network {
    pub const ALL: [Network; 2] = [Self::Trc20, Self::Erc20];

    /// Processor currency code, doubles as the callback token
    pub fn code(self) -> &'static str {
        match self {
            Self::Trc20 => "USDT.TRC20",
            Self::Erc20 => "USDT.ERC20",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Trc20 => "USDT TRC20 (TRON)",
            Self::Erc20 => "USDT ERC20 (ETH)",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.code() == token)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Payout rail for the fiat side of the trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Wise,
    Revolut,
    Paypal,
    Bank,
    Skrill,
    Card,
    Payeer,
    Alipay,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 8] = [
        Self::Wise,
        Self::Revolut,
        Self::Paypal,
        Self::Bank,
        Self::Skrill,
        Self::Card,
        Self::Payeer,
        Self::Alipay,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Wise => "wise",
            Self::Revolut => "revolut",
            Self::Paypal => "paypal",
            Self::Bank => "bank",
            Self::Skrill => "skrill",
            Self::Card => "card",
            Self::Payeer => "payeer",
            Self::Alipay => "alipay",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wise => "Wise",
            Self::Revolut => "Revolut",
            Self::Paypal => "PayPal",
            Self::Bank => "Bank Transfer",
            Self::Skrill => "Skrill/Neteller",
            Self::Card => "Visa/Mastercard",
            Self::Payeer => "Payeer",
            Self::Alipay => "Alipay",
        }
    }

    /// What the user must send back for this payout rail
    pub fn instructions(self) -> &'static str {
        match self {
            Self::Wise => "Please provide your Wise email or WiseTag (e.g., @username).",
            Self::Revolut => "Please provide your Revolut tag (Revtag).",
            Self::Paypal => "Please provide your PayPal email.",
            Self::Bank => {
                "Please provide your bank details in this format:\n\nFirst and Last Name\nIBAN\nSWIFT Code"
            }
            Self::Skrill => "Please provide your Skrill/Neteller email.",
            Self::Card => "Please provide your Visa or Mastercard number.",
            Self::Payeer => "Please provide your Payeer Number (e.g., P12345678).",
            Self::Alipay => "Please provide your Alipay email.",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.token() == token)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Conversation stage. Each variant carries exactly the answers collected
/// before it, so later fields cannot exist without earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    AwaitingFiat,

    AwaitingNetwork {
        fiat: FiatCurrency,
    },

    AwaitingAmount {
        fiat: FiatCurrency,
        network: Network,
    },

    AwaitingPaymentMethod {
        fiat: FiatCurrency,
        network: Network,
        amount: f64,
    },

    AwaitingPaymentDetails {
        fiat: FiatCurrency,
        network: Network,
        amount: f64,
        method: PaymentMethod,
        /// Set once details are submitted; the deposit request is in flight
        details: Option<String>,
    },
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::AwaitingFiat => StageKind::AwaitingFiat,
            Stage::AwaitingNetwork { .. } => StageKind::AwaitingNetwork,
            Stage::AwaitingAmount { .. } => StageKind::AwaitingAmount,
            Stage::AwaitingPaymentMethod { .. } => StageKind::AwaitingPaymentMethod,
            Stage::AwaitingPaymentDetails { .. } => StageKind::AwaitingPaymentDetails,
        }
    }
}

/// Fieldless view of [`Stage`], ordered by position in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    AwaitingFiat,
    AwaitingNetwork,
    AwaitingAmount,
    AwaitingPaymentMethod,
    AwaitingPaymentDetails,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::AwaitingFiat => "awaiting_fiat",
            StageKind::AwaitingNetwork => "awaiting_network",
            StageKind::AwaitingAmount => "awaiting_amount",
            StageKind::AwaitingPaymentMethod => "awaiting_payment_method",
            StageKind::AwaitingPaymentDetails => "awaiting_payment_details",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's in-progress sale
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub stage: Stage,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::AwaitingFiat,
        }
    }

    #[cfg(test)]
    pub fn fiat(&self) -> Option<FiatCurrency> {
        match &self.stage {
            Stage::AwaitingFiat => None,
            Stage::AwaitingNetwork { fiat }
            | Stage::AwaitingAmount { fiat, .. }
            | Stage::AwaitingPaymentMethod { fiat, .. }
            | Stage::AwaitingPaymentDetails { fiat, .. } => Some(*fiat),
        }
    }

    #[cfg(test)]
    pub fn network(&self) -> Option<Network> {
        match &self.stage {
            Stage::AwaitingFiat | Stage::AwaitingNetwork { .. } => None,
            Stage::AwaitingAmount { network, .. }
            | Stage::AwaitingPaymentMethod { network, .. }
            | Stage::AwaitingPaymentDetails { network, .. } => Some(*network),
        }
    }

    #[cfg(test)]
    pub fn amount(&self) -> Option<f64> {
        match &self.stage {
            Stage::AwaitingPaymentMethod { amount, .. }
            | Stage::AwaitingPaymentDetails { amount, .. } => Some(*amount),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        match &self.stage {
            Stage::AwaitingPaymentDetails { method, .. } => Some(*method),
            _ => None,
        }
    }

    pub fn payment_details(&self) -> Option<&str> {
        match &self.stage {
            Stage::AwaitingPaymentDetails { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// True while the deposit-address request is outstanding
    pub fn is_deposit_pending(&self) -> bool {
        self.payment_details().is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Context
// ============================================================================

/// Fixed trading parameters shared by every session
#[derive(Debug, Clone, PartialEq)]
pub struct SaleSettings {
    pub limits: super::quote::AmountLimits,
    pub rates: super::quote::RateTable,
    /// Refund/contact address passed to the processor
    pub refund_email: String,
    /// Chat that receives new-user alerts
    pub admin_chat: ChatId,
}

/// Per-event context for [`super::transition`]
#[derive(Debug, Clone, Copy)]
pub struct SaleContext<'a> {
    pub chat_id: ChatId,
    pub settings: &'a SaleSettings,
}

impl<'a> SaleContext<'a> {
    pub fn new(chat_id: ChatId, settings: &'a SaleSettings) -> Self {
        Self { chat_id, settings }
    }
}
