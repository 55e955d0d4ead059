//! Inbound/outbound contract of a paid request.
//!
//! These are the value types exchanged with the tool-dispatch shell that
//! exposes the flow to an agent: one request in, one structured result out.
//! Each flow run constructs and discards its own instances; nothing here is
//! shared between runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A request the agent wants issued, with payment handled automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidRequest {
    /// Target URL of the (possibly paid) resource.
    pub url: String,
    /// Payer identity known to the wallet service.
    pub payer: String,
    /// HTTP method (e.g., "GET", "POST").
    pub method: String,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// JSON request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Spending cap as a human-decimal amount. When the challenge demands
    /// more, no payment is made and the result reports the shortfall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payment: Option<String>,
    /// Preferred settlement chain, in any form the resolver accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_chain: Option<String>,
}

impl PaidRequest {
    /// Creates a GET request with no payment cap or chain preference.
    #[must_use]
    pub fn get(url: impl Into<String>, payer: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            payer: payer.into(),
            method: "GET".to_owned(),
            headers: None,
            body: None,
            max_payment: None,
            preferred_chain: None,
        }
    }
}

/// Outcome of a paid request, including payment metadata when one was made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidResponse {
    /// Final HTTP status returned to the caller.
    pub status: u16,
    /// Whether the resource demanded payment (initial response was 402).
    pub payment_required: bool,
    /// Whether a payment was actually settled.
    pub payment_made: bool,
    /// Human-decimal amount that was paid, or required when over the cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Token contract/mint the payment was denominated in, if not native.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Internal chain id the payment targeted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Payee address from the settled option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_to: Option<String>,
    /// Settlement transaction identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    /// Response body: parsed JSON when possible, otherwise raw text.
    pub response: serde_json::Value,
}

impl PaidResponse {
    /// Result for a request the resource answered without demanding payment.
    #[must_use]
    pub fn unpaid(status: u16, response: serde_json::Value) -> Self {
        Self {
            status,
            payment_required: false,
            payment_made: false,
            amount: None,
            token: None,
            chain_id: None,
            pay_to: None,
            tx_id: None,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_request_wire_shape() {
        let request: PaidRequest = serde_json::from_value(serde_json::json!({
            "url": "https://api.example.com/paid",
            "payer": "agent-1",
            "method": "POST",
            "maxPayment": "0.5",
            "preferredChain": "base"
        }))
        .unwrap();
        assert_eq!(request.max_payment.as_deref(), Some("0.5"));
        assert_eq!(request.preferred_chain.as_deref(), Some("base"));
        assert!(request.headers.is_none());
    }

    #[test]
    fn test_paid_response_wire_shape() {
        let response = PaidResponse {
            status: 200,
            payment_required: true,
            payment_made: true,
            amount: Some("0.01".to_owned()),
            token: None,
            chain_id: Some(8453),
            pay_to: Some("0x1111111111111111111111111111111111111111".to_owned()),
            tx_id: Some("0xabc".to_owned()),
            response: serde_json::json!({"ok": true}),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["paymentMade"], true);
        assert_eq!(value["chainId"], 8453);
        assert_eq!(value["txId"], "0xabc");
        assert!(value.get("token").is_none());
    }
}
