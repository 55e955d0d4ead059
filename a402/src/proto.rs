//! x402 wire format: payment challenges and payment proofs.
//!
//! A resource server answering 402 Payment Required sends a JSON body with a
//! ranked `accepts` list of payment options. After settling one of them, the
//! client retries the original request carrying a [`PaymentProof`] in the
//! `X-PAYMENT` header as base64-encoded JSON.
//!
//! Option order is meaningful: servers list their preferred option first, and
//! selection deliberately preserves that ordering (first match on the
//! caller's preferred chain, else first option).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use serde::{Deserialize, Serialize};

use crate::chain::{self, ChainIdentity};

/// Header carrying the base64-encoded payment proof on the retried request.
pub const X_PAYMENT_HEADER: &str = "X-PAYMENT";

/// A 402 challenge body that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed payment challenge: {reason}")]
pub struct MalformedChallengeError {
    /// Why the challenge was rejected.
    pub reason: String,
}

impl MalformedChallengeError {
    /// Creates a new error with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Scheme-specific extra data on a payment option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionExtra {
    /// Token contract address (EVM) or mint (account-based). Absent means
    /// payment in the chain's native asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Human-readable label for the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One acceptable payment from a 402 challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    /// The payment scheme (e.g., "exact").
    pub scheme: String,
    /// Network identifier as the server wrote it; resolved lazily and echoed
    /// verbatim into the proof.
    pub network: String,
    /// Required amount in raw units, as a non-negative integer string.
    pub max_amount_required: String,
    /// Payee address.
    pub pay_to: String,
    /// Decimals of the asset the amount is denominated in.
    pub required_decimals: u8,
    /// Optional token identity and label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<OptionExtra>,
}

impl PaymentOption {
    /// Returns the token contract/mint address, if the option names one.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.extra.as_ref().and_then(|extra| extra.token.as_deref())
    }
}

/// HTTP 402 Payment Required challenge body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version.
    pub x402_version: u32,
    /// Acceptable payment options, in server preference order.
    #[serde(default)]
    pub accepts: Vec<PaymentOption>,
    /// Server-supplied error string explaining why payment is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentRequired {
    /// Parses a 402 response body.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedChallengeError`] if the body is not valid JSON or
    /// the `accepts` list is missing or empty.
    pub fn parse(body: &[u8]) -> Result<Self, MalformedChallengeError> {
        let challenge: Self = serde_json::from_slice(body)
            .map_err(|e| MalformedChallengeError::new(format!("invalid JSON body: {e}")))?;
        if challenge.accepts.is_empty() {
            return Err(MalformedChallengeError::new("accepts list is empty"));
        }
        Ok(challenge)
    }

    /// Selects the payment option to settle.
    ///
    /// When a preferred chain is given, the first option whose network
    /// resolves to that chain wins; otherwise (or when nothing matches) the
    /// first option in list order wins. Servers rely on list order as an
    /// implicit preference signal, so this rule is preserved exactly.
    #[must_use]
    pub fn select(&self, preferred: Option<&ChainIdentity>) -> Option<&PaymentOption> {
        if let Some(preferred) = preferred {
            let matched = self.accepts.iter().find(|option| {
                chain::resolve(&option.network).is_ok_and(|identity| identity.id == preferred.id)
            });
            if let Some(option) = matched {
                return Some(option);
            }
        }
        self.accepts.first()
    }
}

/// Scheme payload of a payment proof: the settlement identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofPayload {
    /// Transaction hash or signature returned by the executing chain.
    pub tx_hash: String,
}

/// Retry credential proving a challenge was settled.
///
/// Constructed once per successful payment, sent exactly once in the
/// [`X_PAYMENT_HEADER`] of the retried request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Protocol version, echoed from the challenge.
    pub x402_version: u32,
    /// Scheme of the settled option.
    pub scheme: String,
    /// Network string of the settled option, verbatim (not re-resolved).
    pub network: String,
    /// Settlement identifier payload.
    pub payload: ProofPayload,
}

impl PaymentProof {
    /// Serializes the proof to its header value: base64-encoded JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_header(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(b64.encode(json))
    }

    /// Decodes a proof from its header value.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedChallengeError`] if the value is not base64 or the
    /// decoded bytes are not a proof.
    pub fn from_header(value: &str) -> Result<Self, MalformedChallengeError> {
        let bytes = b64
            .decode(value)
            .map_err(|e| MalformedChallengeError::new(format!("invalid base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| MalformedChallengeError::new(format!("invalid proof JSON: {e}")))
    }
}
