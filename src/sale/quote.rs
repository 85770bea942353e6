//! Amount validation and payout quotes

use super::state::FiatCurrency;
use thiserror::Error;

/// Inclusive USDT amount bounds
pub const DEFAULT_MIN_AMOUNT: f64 = 25.0;
pub const DEFAULT_MAX_AMOUNT: f64 = 50_000.0;

/// Premium added on top of the base buying rates, in percent
pub const MARKUP_PERCENT: f64 = 1.5;

const BASE_USD_TO_USDT: f64 = 1.08;
const BASE_USD_TO_EUR: f64 = 0.89;
const BASE_USDT_TO_GBP: f64 = 0.77;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountLimits {
    pub min: f64,
    pub max: f64,
}

impl AmountLimits {
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min && amount <= self.max
    }
}

impl Default for AmountLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_AMOUNT,
            max: DEFAULT_MAX_AMOUNT,
        }
    }
}

/// Fiat paid per USDT, one independent entry per currency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTable {
    pub usd: f64,
    pub eur: f64,
    pub gbp: f64,
}

impl RateTable {
    pub fn rate(&self, fiat: FiatCurrency) -> f64 {
        match fiat {
            FiatCurrency::Usd => self.usd,
            FiatCurrency::Eur => self.eur,
            FiatCurrency::Gbp => self.gbp,
        }
    }

    /// Override a single currency's rate
    #[must_use]
    pub fn with_rate(mut self, fiat: FiatCurrency, rate: f64) -> Self {
        match fiat {
            FiatCurrency::Usd => self.usd = rate,
            FiatCurrency::Eur => self.eur = rate,
            FiatCurrency::Gbp => self.gbp = rate,
        }
        self
    }

    /// Fiat amount for `amount` USDT at full precision
    pub fn quote(&self, amount: f64, fiat: FiatCurrency) -> f64 {
        amount * self.rate(fiat)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let markup = 1.0 + MARKUP_PERCENT / 100.0;
        let usd = (1.0 / BASE_USD_TO_USDT) * markup;
        Self {
            usd,
            eur: usd * BASE_USD_TO_EUR,
            gbp: BASE_USDT_TO_GBP * markup,
        }
    }
}

/// Why an amount reply was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("not a finite number")]
    NotFinite,
    #[error("{amount} is outside [{min}, {max}]")]
    OutOfRange { amount: f64, min: f64, max: f64 },
}

/// Parse a user's amount reply.
///
/// The whole trimmed text must be a decimal number; `"25abc"`, `"inf"` and
/// `"NaN"` are all rejected.
pub fn parse_amount(raw: &str, limits: &AmountLimits) -> Result<f64, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return Err(AmountError::NotANumber(trimmed.to_string()));
    }
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;
    if !amount.is_finite() {
        return Err(AmountError::NotFinite);
    }
    if !limits.contains(amount) {
        return Err(AmountError::OutOfRange {
            amount,
            min: limits.min,
            max: limits.max,
        });
    }
    Ok(amount)
}

/// Two-decimal rendering used only for display
pub fn format_fiat(value: f64) -> String {
    format!("{value:.2}")
}

/// Four-decimal rendering for the rate board
pub fn format_rate(value: f64) -> String {
    format!("{value:.4}")
}
