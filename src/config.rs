//! Process configuration from the environment

use crate::processor::{CoinPaymentsConfig, DEFAULT_API_URL};
use crate::sale::{AmountLimits, ChatId, FiatCurrency, RateTable, SaleSettings};
use std::time::Duration;
use thiserror::Error;

/// Long-poll timeout for `getUpdates`
const POLL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Everything the bot needs at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub poll_timeout: Duration,
    pub coinpayments: CoinPaymentsConfig,
    pub sale: SaleSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; tests pass a map instead of the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let admin_chat = vars
            .parsed::<i64>("ADMIN_CHAT_ID")?
            .ok_or(ConfigError::Missing("ADMIN_CHAT_ID"))?;

        let defaults = AmountLimits::default();
        let limits = AmountLimits {
            min: vars.positive("SELL_MIN_USDT")?.unwrap_or(defaults.min),
            max: vars.positive("SELL_MAX_USDT")?.unwrap_or(defaults.max),
        };
        if limits.min > limits.max {
            return Err(ConfigError::Invalid {
                var: "SELL_MIN_USDT",
                value: limits.min.to_string(),
                reason: "must not exceed SELL_MAX_USDT",
            });
        }

        let mut rates = RateTable::default();
        for (var, fiat) in [
            ("SELL_RATE_USD", FiatCurrency::Usd),
            ("SELL_RATE_EUR", FiatCurrency::Eur),
            ("SELL_RATE_GBP", FiatCurrency::Gbp),
        ] {
            if let Some(rate) = vars.positive(var)? {
                rates = rates.with_rate(fiat, rate);
            }
        }

        Ok(Self {
            telegram_token: vars.required("TELEGRAM_BOT_TOKEN")?,
            poll_timeout: POLL_TIMEOUT,
            coinpayments: CoinPaymentsConfig {
                public_key: vars.required("COINPAYMENTS_PUBLIC_KEY")?,
                private_key: vars.required("COINPAYMENTS_PRIVATE_KEY")?,
                api_url: vars
                    .optional("COINPAYMENTS_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            },
            sale: SaleSettings {
                limits,
                rates,
                refund_email: vars.required("BUYER_REFUND_EMAIL")?,
                admin_chat: ChatId(admin_chat),
            },
        })
    }
}

/// Variable source with blank values treated as unset
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn optional(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing(var))
    }

    fn parsed<T: std::str::FromStr>(&self, var: &'static str) -> Result<Option<T>, ConfigError> {
        self.optional(var)
            .map(|value| {
                value.parse().map_err(|_| ConfigError::Invalid {
                    var,
                    value,
                    reason: "not a number",
                })
            })
            .transpose()
    }

    fn positive(&self, var: &'static str) -> Result<Option<f64>, ConfigError> {
        match self.parsed::<f64>(var)? {
            Some(v) if !v.is_finite() || v <= 0.0 => Err(ConfigError::Invalid {
                var,
                value: v.to_string(),
                reason: "must be a positive number",
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn required_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ADMIN_CHAT_ID", "-1001234"),
            ("COINPAYMENTS_PUBLIC_KEY", "pub"),
            ("COINPAYMENTS_PRIVATE_KEY", "priv"),
            ("BUYER_REFUND_EMAIL", "refunds@example.com"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults_apply() {
        let config = load(&required_vars()).unwrap();
        assert_eq!(config.sale.admin_chat, ChatId(-1_001_234));
        assert_eq!(config.sale.limits, AmountLimits::default());
        assert_eq!(config.sale.rates, RateTable::default());
        assert_eq!(config.coinpayments.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_timeout, POLL_TIMEOUT);
    }

    #[test]
    fn test_missing_required_is_reported() {
        let mut vars = required_vars();
        vars.remove("COINPAYMENTS_PRIVATE_KEY");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("COINPAYMENTS_PRIVATE_KEY")
        );

        let mut vars = required_vars();
        vars.insert("BUYER_REFUND_EMAIL", "   ");
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("BUYER_REFUND_EMAIL")
        );
    }

    #[test]
    fn test_overrides_apply() {
        let mut vars = required_vars();
        vars.insert("SELL_MIN_USDT", "10");
        vars.insert("SELL_MAX_USDT", "1000");
        vars.insert("SELL_RATE_EUR", "0.9");
        let config = load(&vars).unwrap();

        assert!(config.sale.limits.contains(10.0));
        assert!(!config.sale.limits.contains(1000.5));
        assert!((config.sale.rates.rate(FiatCurrency::Eur) - 0.9).abs() < f64::EPSILON);
        assert!(
            (config.sale.rates.rate(FiatCurrency::Usd) - RateTable::default().rate(FiatCurrency::Usd))
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut vars = required_vars();
        vars.insert("ADMIN_CHAT_ID", "@admin");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "ADMIN_CHAT_ID", .. })
        ));

        let mut vars = required_vars();
        vars.insert("SELL_RATE_GBP", "-1");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "SELL_RATE_GBP", .. })
        ));

        let mut vars = required_vars();
        vars.insert("SELL_MIN_USDT", "500");
        vars.insert("SELL_MAX_USDT", "100");
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { var: "SELL_MIN_USDT", .. })
        ));
    }
}
