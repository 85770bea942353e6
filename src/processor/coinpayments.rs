//! CoinPayments provider implementation

use super::types::{DepositAddress, DepositRequest};
use super::{PaymentProcessor, ProcessorError};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha512;
use std::time::Duration;

type HmacSha512 = Hmac<Sha512>;

pub const DEFAULT_API_URL: &str = "https://www.coinpayments.net/api.php";

const API_VERSION: &str = "1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on the processor's timeout field when computing the expiry
const MAX_VALIDITY_SECS: u64 = 30 * 24 * 3600;

/// CoinPayments credentials and endpoint
#[derive(Debug, Clone)]
pub struct CoinPaymentsConfig {
    pub public_key: String,
    pub private_key: String,
    pub api_url: String,
}

/// CoinPayments `create_transaction` client
pub struct CoinPaymentsService {
    client: Client,
    config: CoinPaymentsConfig,
}

impl CoinPaymentsService {
    pub fn new(config: CoinPaymentsConfig) -> Result<Self, ProcessorError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProcessorError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Form-encoded body for a `create_transaction` call
    fn encode_request(&self, request: &DepositRequest) -> Result<String, ProcessorError> {
        let custom = request
            .custom
            .to_json()
            .map_err(|e| ProcessorError::decode(format!("Failed to encode custom payload: {e}")))?;
        let amount = request.amount.to_string();

        Ok(url::form_urlencoded::Serializer::new(String::new())
            .append_pair("version", API_VERSION)
            .append_pair("cmd", "create_transaction")
            .append_pair("key", &self.config.public_key)
            .append_pair("format", "json")
            .append_pair("amount", &amount)
            .append_pair("currency1", request.currency.code())
            .append_pair("currency2", request.currency.code())
            .append_pair("buyer_email", &request.buyer_email)
            .append_pair("item_name", &request.item_name)
            .append_pair("custom", &custom)
            .finish())
    }

    fn sign(&self, body: &str) -> Result<String, ProcessorError> {
        let mut mac = HmacSha512::new_from_slice(self.config.private_key.as_bytes())
            .map_err(|e| ProcessorError::api(format!("Invalid private key: {e}")))?;
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn normalize_response(resp: CoinPaymentsResponse) -> Result<DepositAddress, ProcessorError> {
        if resp.error != "ok" {
            return Err(ProcessorError::api(resp.error));
        }
        let result = resp
            .result
            .ok_or_else(|| ProcessorError::decode("Response has no result"))?;

        let timeout_secs = result.timeout.as_u64().ok_or_else(|| {
            ProcessorError::decode(format!("Invalid timeout: {}", result.timeout.as_string()))
        })?;
        let validity = i64::try_from(timeout_secs.min(MAX_VALIDITY_SECS)).unwrap_or_default();

        Ok(DepositAddress {
            amount: result.amount.as_string(),
            address: result.address,
            txn_id: result.txn_id,
            timeout_secs,
            qrcode_url: result.qrcode_url.filter(|u| !u.is_empty()),
            status_url: result.status_url.filter(|u| !u.is_empty()),
            expires_at: Utc::now() + chrono::Duration::seconds(validity),
        })
    }
}

#[async_trait]
impl PaymentProcessor for CoinPaymentsService {
    async fn create_transaction(
        &self,
        request: &DepositRequest,
    ) -> Result<DepositAddress, ProcessorError> {
        let body = self.encode_request(request)?;
        let signature = self.sign(&body)?;

        let response = self
            .client
            .post(&self.config.api_url)
            .header("HMAC", signature)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProcessorError::network(format!("HTTP {status}: {text}")));
        }

        let parsed: CoinPaymentsResponse = response.json().await?;
        Self::normalize_response(parsed)
    }

    fn name(&self) -> &'static str {
        "coinpayments"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CoinPaymentsResponse {
    error: String,
    #[serde(default)]
    result: Option<TransactionResult>,
}

#[derive(Debug, Deserialize)]
struct TransactionResult {
    amount: StringOrNumber,
    address: String,
    txn_id: String,
    timeout: StringOrNumber,
    #[serde(default)]
    status_url: Option<String>,
    #[serde(default)]
    qrcode_url: Option<String>,
}

/// The API is loose about quoting numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(serde_json::Number),
    String(String),
}

impl StringOrNumber {
    fn as_string(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            Self::String(s) => s.trim().parse().ok(),
        }
    }
}
