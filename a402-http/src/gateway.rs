//! Client for the remote custodial wallet service.
//!
//! The wallet service owns keys, signing, and broadcast; this module only
//! decides what to ask it for. [`WalletGateway`] is the seam the payment
//! flow depends on, and [`HttpWalletGateway`] is the production
//! implementation speaking JSON over HTTPS.
//!
//! Every gateway request carries the [`BYPASS_HEADER`] marker so a wallet
//! service that is itself protected by the x402 scheme does not recursively
//! challenge its own payment traffic.

use std::time::Duration;

use a402::chain::ChainFamily;
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

/// Request header marking gateway traffic as exempt from 402 challenges.
pub const BYPASS_HEADER: &str = "X-Payment-Bypass";

/// Default timeout for the payment-execution leg.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// A transfer for the wallet service to sign and broadcast.
///
/// For EVM token payments `data` carries ABI calldata and `value` is zero;
/// for EVM native payments `value` carries the raw amount and `data` is
/// absent. Account-based chains get `token_mint`/`token_decimals` instead —
/// the wallet service constructs the instruction itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSpec {
    /// Destination address (payee, or token contract when `data` is set).
    pub to: String,
    /// Native value or token amount in raw units.
    pub value: String,
    /// Internal chain id the transfer executes on.
    pub chain_id: u64,
    /// ABI calldata, 0x-prefixed hex (EVM token operations only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Token mint address (account-based token payments only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<String>,
    /// Token decimals (account-based token payments only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_decimals: Option<u8>,
}

/// Settlement receipt returned by the wallet service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    /// Transaction hash (EVM chains).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Transaction signature (account-based chains).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SendReceipt {
    /// Returns the settlement identifier for the given chain family.
    ///
    /// EVM receipts carry `txHash`, account-based receipts carry
    /// `signature`; whichever the family names is preferred, with the other
    /// as fallback for gateways that populate a single field.
    #[must_use]
    pub fn settlement_id(&self, family: ChainFamily) -> Option<&str> {
        let (first, second) = match family {
            ChainFamily::Evm => (&self.tx_hash, &self.signature),
            ChainFamily::AccountBased => (&self.signature, &self.tx_hash),
        };
        first.as_deref().or(second.as_deref())
    }
}

/// Errors from the wallet gateway leg.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// URL construction failed.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("gateway HTTP error: {source}")]
    Http {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The gateway did not answer within the configured timeout.
    #[error("gateway request timed out")]
    Timeout,
    /// The gateway answered with a non-success status.
    #[error("gateway returned HTTP {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: StatusCode,
        /// The response body, as text.
        body: String,
    },
    /// The gateway response was not valid receipt JSON.
    #[error("failed to deserialize gateway response: {source}")]
    Json {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The receipt carried neither a transaction hash nor a signature.
    #[error("gateway receipt carries no settlement identifier")]
    MissingSettlementId,
}

/// The payment flow's only side-effecting dependency.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Asks the wallet service to sign and broadcast a transfer on behalf of
    /// the given payer identity.
    async fn send(&self, payer: &str, transfer: &TransferSpec)
    -> Result<SendReceipt, GatewayError>;
}

#[async_trait]
impl<T: WalletGateway + ?Sized> WalletGateway for std::sync::Arc<T> {
    async fn send(
        &self,
        payer: &str,
        transfer: &TransferSpec,
    ) -> Result<SendReceipt, GatewayError> {
        (**self).send(payer, transfer).await
    }
}

/// Wire body of a gateway send request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    payer: &'a str,
    #[serde(flatten)]
    transfer: &'a TransferSpec,
}

/// JSON-over-HTTP implementation of [`WalletGateway`].
#[derive(Debug, Clone)]
pub struct HttpWalletGateway {
    send_url: Url,
    client: Client,
    headers: HeaderMap,
    timeout: Duration,
}

impl HttpWalletGateway {
    /// Constructs a gateway client from the wallet service base URL.
    ///
    /// The send endpoint is `./send` relative to the base.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UrlParse`] if endpoint construction fails.
    pub fn try_new(base_url: Url) -> Result<Self, GatewayError> {
        let send_url = base_url
            .join("./send")
            .map_err(|e| GatewayError::UrlParse {
                context: "Failed to construct ./send URL",
                source: e,
            })?;
        Ok(Self {
            send_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        })
    }

    /// Attaches custom headers (e.g., credentials) to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the computed `./send` URL.
    #[must_use]
    pub const fn send_url(&self) -> &Url {
        &self.send_url
    }
}

#[async_trait]
impl WalletGateway for HttpWalletGateway {
    async fn send(
        &self,
        payer: &str,
        transfer: &TransferSpec,
    ) -> Result<SendReceipt, GatewayError> {
        let body = SendRequest { payer, transfer };
        let response = self
            .client
            .post(self.send_url.clone())
            .headers(self.headers.clone())
            .header(BYPASS_HEADER, "1")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Http { source: e }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        response
            .json::<SendReceipt>()
            .await
            .map_err(|e| GatewayError::Json { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transfer() -> TransferSpec {
        TransferSpec {
            to: "0x1111111111111111111111111111111111111111".to_owned(),
            value: "100000".to_owned(),
            chain_id: 8453,
            data: None,
            token_mint: None,
            token_decimals: None,
        }
    }

    #[test]
    fn test_settlement_id_prefers_family_field() {
        let receipt = SendReceipt {
            tx_hash: Some("0xhash".to_owned()),
            signature: Some("sig".to_owned()),
        };
        assert_eq!(receipt.settlement_id(ChainFamily::Evm), Some("0xhash"));
        assert_eq!(
            receipt.settlement_id(ChainFamily::AccountBased),
            Some("sig")
        );
    }

    #[test]
    fn test_settlement_id_falls_back_across_fields() {
        let receipt = SendReceipt {
            tx_hash: None,
            signature: Some("sig".to_owned()),
        };
        assert_eq!(receipt.settlement_id(ChainFamily::Evm), Some("sig"));
        assert_eq!(SendReceipt::default().settlement_id(ChainFamily::Evm), None);
    }

    #[tokio::test]
    async fn test_send_posts_flattened_body_with_bypass_marker() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header(BYPASS_HEADER, "1"))
            .and(body_partial_json(serde_json::json!({
                "payer": "agent-1",
                "to": "0x1111111111111111111111111111111111111111",
                "value": "100000",
                "chainId": 8453
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"txHash": "0xabc"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway =
            HttpWalletGateway::try_new(mock_server.uri().parse::<Url>().unwrap()).unwrap();
        let receipt = gateway.send("agent-1", &transfer()).await.unwrap();
        assert_eq!(receipt.tx_hash.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn test_send_surfaces_error_status_with_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let gateway =
            HttpWalletGateway::try_new(mock_server.uri().parse::<Url>().unwrap()).unwrap();
        let err = gateway.send("agent-1", &transfer()).await.unwrap_err();
        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
