//! x402 payment gate.
//!
//! The knowledge-graph service answers premium queries with HTTP 402 and a
//! JSON body listing accepted payment options. A connected wallet signs one
//! of them and the request is retried once with `X-PAYMENT`; without a
//! wallet the caller gets a paywall description instead.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DkgError, DkgResult};
use crate::model::{PaymentInfo, PaymentRequirements};

pub const X_PAYMENT: &str = "x-payment";
pub const X_PAYMENT_VERSION: &str = "x-payment-version";
pub const X_PAYMENT_SIGNATURE: &str = "x-payment-signature";
pub const X_PAYMENT_TIMESTAMP: &str = "x-payment-timestamp";
pub const X_PAYMENT_RESPONSE: &str = "x-payment-response";

/// Headers the client sends with a paid request.
pub const PAYMENT_REQUEST_HEADERS: [&str; 4] = [
    X_PAYMENT,
    X_PAYMENT_VERSION,
    X_PAYMENT_SIGNATURE,
    X_PAYMENT_TIMESTAMP,
];

/// Divisor from `maxAmountRequired` units to US dollars.
pub const AMOUNT_UNITS_PER_USD: f64 = 10_000.0;

/// True for any header that belongs to the payment handshake.
pub fn is_payment_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    PAYMENT_REQUEST_HEADERS.contains(&name.as_str()) || name == X_PAYMENT_RESPONSE
}

/// Convert `maxAmountRequired` to dollars.
pub fn price_usd(max_amount_required: &str) -> DkgResult<f64> {
    let amount: f64 = max_amount_required.trim().parse().map_err(|_| {
        DkgError::payment(format!("invalid maxAmountRequired: {max_amount_required}"))
    })?;
    Ok(amount / AMOUNT_UNITS_PER_USD)
}

/// Parsed body of a 402 response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    #[serde(default)]
    pub x402_version: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
}

impl PaymentRequired {
    /// Parse a 402 body. A body without any accepted option is rejected.
    pub fn from_body(body: &Value) -> DkgResult<Self> {
        let parsed: Self = serde_json::from_value(body.clone())
            .map_err(|e| DkgError::payment(format!("malformed 402 body: {e}")))?;
        if parsed.accepts.is_empty() {
            return Err(DkgError::payment("402 body lists no accepted payment option"));
        }
        Ok(parsed)
    }

    /// The option the gateway pays with (`accepts[0]`).
    pub fn requirements(&self) -> &PaymentRequirements {
        &self.accepts[0]
    }

    /// Paywall description. `fallback_title` is used when the option has no description.
    pub fn payment_info(&self, fallback_title: &str) -> DkgResult<PaymentInfo> {
        let req = self.requirements();
        let title = if req.description.trim().is_empty() {
            fallback_title.to_string()
        } else {
            req.description.clone()
        };
        Ok(PaymentInfo {
            price_usd: price_usd(&req.max_amount_required)?,
            title,
            wallet_address: req.pay_to.clone(),
        })
    }
}

/// What to do with a 402.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// No wallet: show the price and recipient, do not retry.
    ShowPaywall(PaymentInfo),
    /// Wallet connected: sign these requirements and retry once.
    PayAndRetry(PaymentRequirements),
    /// A signed request was still refused.
    Rejected,
}

/// Decides how a 402 is handled.
pub struct PaymentGate;

impl PaymentGate {
    pub fn decide(
        required: &PaymentRequired,
        title: &str,
        wallet_connected: bool,
        already_paid: bool,
    ) -> DkgResult<GateDecision> {
        let decision = match (wallet_connected, already_paid) {
            (false, _) => GateDecision::ShowPaywall(required.payment_info(title)?),
            (true, false) => GateDecision::PayAndRetry(required.requirements().clone()),
            (true, true) => GateDecision::Rejected,
        };
        debug!(wallet_connected, already_paid, ?decision, "Payment gate decision");
        Ok(decision)
    }
}

/// Header values for a paid request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentHeaders {
    pub payment: String,
    pub version: Option<String>,
    pub signature: Option<String>,
    pub timestamp: Option<String>,
}

impl PaymentHeaders {
    /// `(name, value)` pairs for every header that is set.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(X_PAYMENT, self.payment.clone())];
        if let Some(v) = &self.version {
            pairs.push((X_PAYMENT_VERSION, v.clone()));
        }
        if let Some(s) = &self.signature {
            pairs.push((X_PAYMENT_SIGNATURE, s.clone()));
        }
        if let Some(t) = &self.timestamp {
            pairs.push((X_PAYMENT_TIMESTAMP, t.clone()));
        }
        pairs
    }
}

/// Produces payment headers for a set of requirements (the wallet).
#[async_trait]
pub trait PaymentSigner: Send + Sync {
    async fn sign(&self, requirements: &PaymentRequirements) -> DkgResult<PaymentHeaders>;
}

/// Replays a payment header signed elsewhere.
///
/// The header is base64-encoded JSON as defined by x402. Its `scheme` and
/// `network`, when present, must match the requirements being paid.
#[derive(Debug, Clone)]
pub struct StaticPaymentSigner {
    header: String,
    payload: Value,
}

impl StaticPaymentSigner {
    pub fn new(header: impl Into<String>) -> DkgResult<Self> {
        let header = header.into().trim().to_string();
        let payload = decode_base64_json(&header)?;
        Ok(Self { header, payload })
    }
}

#[async_trait]
impl PaymentSigner for StaticPaymentSigner {
    async fn sign(&self, requirements: &PaymentRequirements) -> DkgResult<PaymentHeaders> {
        for (field, expected) in [("scheme", &requirements.scheme), ("network", &requirements.network)] {
            if let Some(actual) = self.payload.get(field).and_then(Value::as_str) {
                if !expected.is_empty() && actual != expected {
                    return Err(DkgError::payment(format!(
                        "signed payment {field} '{actual}' does not match required '{expected}'"
                    )));
                }
            }
        }

        Ok(PaymentHeaders {
            payment: self.header.clone(),
            version: self
                .payload
                .get("x402Version")
                .and_then(Value::as_u64)
                .map(|v| v.to_string()),
            signature: None,
            timestamp: Some(chrono::Utc::now().timestamp_millis().to_string()),
        })
    }
}

/// Decode an `X-PAYMENT-RESPONSE` settlement receipt.
pub fn decode_payment_response(header: &str) -> DkgResult<Value> {
    decode_base64_json(header.trim())
}

fn decode_base64_json(raw: &str) -> DkgResult<Value> {
    let bytes = BASE64
        .decode(raw)
        .map_err(|e| DkgError::payment(format!("payment header is not base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DkgError::payment(format!("payment header is not JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(amount: Value) -> Value {
        json!({
            "x402Version": 1,
            "error": "X-PAYMENT header is required",
            "accepts": [{
                "scheme": "exact",
                "network": "base-sepolia",
                "maxAmountRequired": amount,
                "resource": "http://localhost:9200/api/dkgpedia/query/Cattle",
                "description": "Premium analysis: Cattle",
                "payTo": "0x1234567890abcdef1234567890abcdef12345678",
                "asset": "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
                "maxTimeoutSeconds": 60
            }]
        })
    }

    #[test]
    fn test_price_conversion() {
        let required = PaymentRequired::from_body(&body(json!("250000"))).unwrap();
        let info = required.payment_info("Cattle").unwrap();
        assert_eq!(info.price_usd, 25.0);
        assert_eq!(info.display_price(), "25.00");
        assert_eq!(info.title, "Premium analysis: Cattle");
        assert_eq!(info.wallet_address, "0x1234567890abcdef1234567890abcdef12345678");
    }

    #[test]
    fn test_numeric_amount_and_fallback_title() {
        let mut raw = body(json!(5000));
        raw["accepts"][0]["description"] = json!("");
        let info = PaymentRequired::from_body(&raw)
            .unwrap()
            .payment_info("Cattle")
            .unwrap();
        assert_eq!(info.display_price(), "0.50");
        assert_eq!(info.title, "Cattle");
    }

    #[test]
    fn test_rejects_empty_accepts() {
        let err = PaymentRequired::from_body(&json!({ "accepts": [] })).unwrap_err();
        assert!(matches!(err, DkgError::Payment(_)));
        assert!(PaymentRequired::from_body(&json!("nope")).is_err());
    }

    #[test]
    fn test_invalid_amount() {
        let required = PaymentRequired::from_body(&body(json!("lots"))).unwrap();
        assert!(required.payment_info("Cattle").is_err());
    }

    #[test]
    fn test_gate_decisions() {
        let required = PaymentRequired::from_body(&body(json!("250000"))).unwrap();

        match PaymentGate::decide(&required, "Cattle", false, false).unwrap() {
            GateDecision::ShowPaywall(info) => assert_eq!(info.display_price(), "25.00"),
            other => panic!("unexpected decision: {:?}", other),
        }
        assert!(matches!(
            PaymentGate::decide(&required, "Cattle", true, false).unwrap(),
            GateDecision::PayAndRetry(_)
        ));
        assert_eq!(
            PaymentGate::decide(&required, "Cattle", true, true).unwrap(),
            GateDecision::Rejected
        );
    }

    #[test]
    fn test_payment_header_names() {
        assert!(is_payment_header("X-PAYMENT"));
        assert!(is_payment_header("x-payment-response"));
        assert!(is_payment_header("X-Payment-Timestamp"));
        assert!(!is_payment_header("authorization"));
    }

    #[tokio::test]
    async fn test_static_signer() {
        let payload = json!({ "x402Version": 1, "scheme": "exact", "network": "base-sepolia", "payload": {} });
        let header = BASE64.encode(payload.to_string());
        let signer = StaticPaymentSigner::new(header.clone()).unwrap();
        let required = PaymentRequired::from_body(&body(json!("250000"))).unwrap();

        let headers = signer.sign(required.requirements()).await.unwrap();
        assert_eq!(headers.payment, header);
        assert_eq!(headers.version.as_deref(), Some("1"));
        assert!(headers.pairs().iter().any(|(name, _)| *name == X_PAYMENT_TIMESTAMP));
    }

    #[tokio::test]
    async fn test_static_signer_network_mismatch() {
        let payload = json!({ "x402Version": 1, "scheme": "exact", "network": "base" });
        let signer = StaticPaymentSigner::new(BASE64.encode(payload.to_string())).unwrap();
        let required = PaymentRequired::from_body(&body(json!("250000"))).unwrap();
        assert!(signer.sign(required.requirements()).await.is_err());
    }

    #[test]
    fn test_static_signer_rejects_garbage() {
        assert!(StaticPaymentSigner::new("not base64!").is_err());
        assert!(StaticPaymentSigner::new(BASE64.encode("plain text")).is_err());
    }

    #[test]
    fn test_decode_payment_response() {
        let receipt = json!({ "success": true, "transaction": "0xabc", "network": "base-sepolia" });
        let decoded = decode_payment_response(&BASE64.encode(receipt.to_string())).unwrap();
        assert_eq!(decoded["transaction"], "0xabc");
    }
}
