//! x402 payment models.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One accepted payment option from a 402 response body (`accepts[n]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub network: String,
    /// Price in micro-dollar units, as a decimal string.
    #[serde(deserialize_with = "string_or_number")]
    pub max_amount_required: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pay_to: String,
    #[serde(default)]
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout_seconds: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for maxAmountRequired, got {}",
            other
        ))),
    }
}

/// What the paywall shows for a locked asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub price_usd: f64,
    pub title: String,
    pub wallet_address: String,
}

impl PaymentInfo {
    /// Price with two decimals, e.g. `25.00`.
    pub fn display_price(&self) -> String {
        format!("{:.2}", self.price_usd)
    }
}

impl fmt::Display for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${} for '{}' (pay to {})",
            self.display_price(),
            self.title,
            self.wallet_address
        )
    }
}
