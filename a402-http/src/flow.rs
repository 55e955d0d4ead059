//! The x402 payment orchestrator.
//!
//! [`PaymentFlow`] drives one request through the protocol state machine:
//!
//! ```text
//! Requesting → (402?) → NoPaymentNeeded
//!                     | ParsingChallenge → SelectingOption → EnforcingLimit
//!                       → (reject | proceed) → ExecutingPayment
//!                       → BuildingProof → Retrying → Done
//! ```
//!
//! Each run owns its own request/response values and touches no shared
//! mutable state, so any number of flows can run concurrently. Both network
//! legs are bounded by a timeout; the protocol-mandated retry happens exactly
//! once, and a 402 on the retry is returned to the caller untouched.

use std::collections::HashMap;
use std::time::Duration;

use a402::abi::TokenCall;
use a402::amount;
use a402::chain::{self, ChainFamily, ChainIdentity};
use a402::proto::{MalformedChallengeError, PaymentOption, PaymentProof, PaymentRequired, ProofPayload, X_PAYMENT_HEADER};
use alloy_primitives::{Address, U256, hex};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use reqwest::Client;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument, trace};

use crate::gateway::{GatewayError, TransferSpec, WalletGateway};
use crate::guard::{GuardError, UrlGuard};
use crate::types::{PaidRequest, PaidResponse};

/// Default timeout for the protocol leg (initial request and retry).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which network leg of the flow timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// The request to the paid resource (initial or retry).
    Resource,
    /// The payment-execution call to the wallet gateway.
    Gateway,
}

impl std::fmt::Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::Gateway => write!(f, "gateway"),
        }
    }
}

/// A payment flow run that could not complete.
///
/// A challenge exceeding the caller's spending cap is deliberately NOT an
/// error: it produces a normal [`PaidResponse`] with `payment_made` false so
/// the caller can raise the cap and retry externally.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// The target URL failed the SSRF guard.
    #[error(transparent)]
    Guard(#[from] GuardError),
    /// The caller's spending cap is not a valid decimal amount.
    #[error(transparent)]
    Amount(#[from] amount::InvalidAmountError),
    /// A network identifier could not be resolved.
    #[error(transparent)]
    Chain(#[from] chain::UnresolvedChainError),
    /// The 402 body was not a usable challenge.
    #[error(transparent)]
    MalformedChallenge(#[from] MalformedChallengeError),
    /// The caller's request itself was unusable (method, header, URL).
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request.
        reason: String,
    },
    /// HTTP transport failure on the protocol leg.
    #[error("resource request failed: {source}")]
    Http {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// A network leg exceeded its timeout bound.
    #[error("{leg} request timed out")]
    Timeout {
        /// Which leg timed out.
        leg: Leg,
    },
    /// The wallet gateway failed to execute the payment. Carries the
    /// challenge's own error text for context; no partial state survives.
    #[error("payment execution failed: {source} (challenge: {challenge_error})")]
    PaymentExecutionFailed {
        /// The gateway failure.
        #[source]
        source: GatewayError,
        /// Error text from the original 402 challenge.
        challenge_error: String,
    },
    /// The payment proof could not be serialized.
    #[error("failed to encode payment proof: {0}")]
    ProofEncoding(#[from] serde_json::Error),
}

/// The x402 payment state machine.
///
/// Holds only configuration: the wallet gateway, the URL guard, and timing
/// knobs. [`PaymentFlow::execute`] borrows `self` immutably, so one flow
/// value serves concurrent runs.
#[derive(Debug, Clone)]
pub struct PaymentFlow<G> {
    http: Client,
    gateway: G,
    guard: UrlGuard,
    request_timeout: Duration,
    settle_delay: Option<Duration>,
}

impl<G: WalletGateway> PaymentFlow<G> {
    /// Creates a flow with the strict URL guard and default timeout.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            http: Client::new(),
            gateway,
            guard: UrlGuard::strict(),
            request_timeout: REQUEST_TIMEOUT,
            settle_delay: None,
        }
    }

    /// Replaces the URL guard policy.
    #[must_use]
    pub const fn with_guard(mut self, guard: UrlGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Sets the timeout bound for the protocol leg.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Waits the given delay between settlement and retry, giving the chain
    /// time to confirm before the resource server re-validates payment.
    ///
    /// The wait is a cooperative sleep; it never blocks other flows.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    /// Runs one request through the payment state machine.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError`] on any failure except a challenge exceeding the
    /// caller's `max_payment`, which yields an `Ok` result with
    /// `payment_made` false.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "a402.flow.execute", skip_all, fields(url = %request.url), err)
    )]
    pub async fn execute(&self, request: &PaidRequest) -> Result<PaidResponse, FlowError> {
        let url = Url::parse(&request.url).map_err(|e| FlowError::InvalidRequest {
            reason: format!("invalid URL {:?}: {e}", request.url),
        })?;
        self.guard.check(&url)?;

        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|_| FlowError::InvalidRequest {
                reason: format!("invalid HTTP method {:?}", request.method),
            })?;
        let headers = build_headers(request.headers.as_ref())?;
        let preferred = match &request.preferred_chain {
            Some(identifier) => Some(chain::resolve(identifier)?),
            None => None,
        };

        // Requesting
        let initial = self
            .issue(&method, &url, &headers, request.body.as_ref(), None)
            .await?;
        let status = initial.status();
        if status != StatusCode::PAYMENT_REQUIRED {
            #[cfg(feature = "telemetry")]
            trace!(status = %status, "no payment needed");
            let body = read_body(initial).await?;
            return Ok(PaidResponse::unpaid(status.as_u16(), body));
        }

        #[cfg(feature = "telemetry")]
        info!("received 402 Payment Required, processing payment");

        // ParsingChallenge / SelectingOption
        let challenge_bytes = initial
            .bytes()
            .await
            .map_err(|e| map_reqwest(e, Leg::Resource))?;
        let challenge = PaymentRequired::parse(&challenge_bytes)?;
        let option = challenge
            .select(preferred.as_ref())
            .ok_or_else(|| MalformedChallengeError::new("accepts list is empty"))?;
        let identity = chain::resolve(&option.network)?;
        let required = U256::from_str_radix(&option.max_amount_required, 10).map_err(|_| {
            MalformedChallengeError::new(format!(
                "required amount is not an integer: {:?}",
                option.max_amount_required
            ))
        })?;

        #[cfg(feature = "telemetry")]
        debug!(
            scheme = %option.scheme,
            network = %option.network,
            required = %required,
            "selected payment option"
        );

        // EnforcingLimit
        if let Some(cap) = &request.max_payment {
            let cap_raw = amount::to_raw(cap, option.required_decimals)?;
            if required > cap_raw {
                #[cfg(feature = "telemetry")]
                info!(required = %required, cap = %cap_raw, "required amount exceeds cap, not paying");
                return Ok(limit_exceeded_response(
                    &challenge_bytes,
                    option,
                    &identity,
                    required,
                )?);
            }
        }

        // ExecutingPayment
        let challenge_error = challenge.error.clone().unwrap_or_default();
        let transfer = build_transfer(option, &identity, required)?;
        let receipt = self
            .gateway
            .send(&request.payer, &transfer)
            .await
            .map_err(|e| match e {
                GatewayError::Timeout => FlowError::Timeout { leg: Leg::Gateway },
                source => FlowError::PaymentExecutionFailed {
                    source,
                    challenge_error: challenge_error.clone(),
                },
            })?;
        let tx_id = receipt
            .settlement_id(identity.family)
            .ok_or(FlowError::PaymentExecutionFailed {
                source: GatewayError::MissingSettlementId,
                challenge_error,
            })?
            .to_owned();

        #[cfg(feature = "telemetry")]
        info!(tx_id = %tx_id, chain_id = identity.id, "payment settled");

        // BuildingProof
        let proof = PaymentProof {
            x402_version: challenge.x402_version,
            scheme: option.scheme.clone(),
            network: option.network.clone(),
            payload: ProofPayload {
                tx_hash: tx_id.clone(),
            },
        };
        let proof_header = proof.to_header()?;

        // Retrying — exactly once; a second 402 is returned, not re-processed.
        if let Some(delay) = self.settle_delay {
            tokio::time::sleep(delay).await;
        }
        let retry = self
            .issue(&method, &url, &headers, request.body.as_ref(), Some(&proof_header))
            .await?;
        let retry_status = retry.status().as_u16();
        let response = read_body(retry).await?;

        Ok(PaidResponse {
            status: retry_status,
            payment_required: true,
            payment_made: true,
            amount: Some(amount::from_raw_units(
                &required.to_string(),
                option.required_decimals,
            )?),
            token: option.token().map(str::to_owned),
            chain_id: Some(identity.id),
            pay_to: Some(option.pay_to.clone()),
            tx_id: Some(tx_id),
            response,
        })
    }

    /// Issues one request on the protocol leg.
    async fn issue(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&serde_json::Value>,
        proof: Option<&str>,
    ) -> Result<reqwest::Response, FlowError> {
        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .timeout(self.request_timeout)
            .headers(headers.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(proof) = proof {
            builder = builder.header(X_PAYMENT_HEADER, proof);
        }
        builder
            .send()
            .await
            .map_err(|e| map_reqwest(e, Leg::Resource))
    }
}

/// Maps a reqwest error on the protocol leg into the flow taxonomy.
fn map_reqwest(error: reqwest::Error, leg: Leg) -> FlowError {
    if error.is_timeout() {
        FlowError::Timeout { leg }
    } else {
        FlowError::Http { source: error }
    }
}

/// Reads a response body as JSON when possible, raw text otherwise.
async fn read_body(response: reqwest::Response) -> Result<serde_json::Value, FlowError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_reqwest(e, Leg::Resource))?;
    Ok(bytes_to_value(&bytes))
}

fn bytes_to_value(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Converts caller-supplied headers into a typed header map.
fn build_headers(headers: Option<&HashMap<String, String>>) -> Result<HeaderMap, FlowError> {
    let mut map = HeaderMap::new();
    if let Some(headers) = headers {
        for (name, value) in headers {
            let name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| FlowError::InvalidRequest {
                    reason: format!("invalid header name {name:?}"),
                })?;
            let value = HeaderValue::from_str(value).map_err(|_| FlowError::InvalidRequest {
                reason: format!("invalid header value for {name:?}"),
            })?;
            map.insert(name, value);
        }
    }
    Ok(map)
}

/// Builds the structured "over cap" result: payment required but not made.
fn limit_exceeded_response(
    challenge_bytes: &[u8],
    option: &PaymentOption,
    identity: &ChainIdentity,
    required: U256,
) -> Result<PaidResponse, FlowError> {
    Ok(PaidResponse {
        status: StatusCode::PAYMENT_REQUIRED.as_u16(),
        payment_required: true,
        payment_made: false,
        amount: Some(amount::from_raw_units(
            &required.to_string(),
            option.required_decimals,
        )?),
        token: option.token().map(str::to_owned),
        chain_id: Some(identity.id),
        pay_to: Some(option.pay_to.clone()),
        tx_id: None,
        response: bytes_to_value(challenge_bytes),
    })
}

/// Builds the gateway transfer for the selected option.
///
/// Chain family and token presence pick the strategy: EVM native transfer,
/// EVM ERC-20 calldata transfer, or account-based pass-through where the
/// wallet service constructs the instruction from token identity fields.
fn build_transfer(
    option: &PaymentOption,
    identity: &ChainIdentity,
    required: U256,
) -> Result<TransferSpec, FlowError> {
    match identity.family {
        ChainFamily::Evm => match option.token() {
            Some(token) => {
                let to: Address = option.pay_to.parse().map_err(|_| {
                    MalformedChallengeError::new(format!(
                        "payTo is not a valid EVM address: {:?}",
                        option.pay_to
                    ))
                })?;
                let calldata = TokenCall::Transfer {
                    to,
                    value: required,
                }
                .calldata();
                Ok(TransferSpec {
                    to: token.to_owned(),
                    value: "0".to_owned(),
                    chain_id: identity.id,
                    data: Some(format!("0x{}", hex::encode(calldata))),
                    token_mint: None,
                    token_decimals: None,
                })
            }
            None => Ok(TransferSpec {
                to: option.pay_to.clone(),
                value: required.to_string(),
                chain_id: identity.id,
                data: None,
                token_mint: None,
                token_decimals: None,
            }),
        },
        ChainFamily::AccountBased => Ok(TransferSpec {
            to: option.pay_to.clone(),
            value: required.to_string(),
            chain_id: identity.id,
            data: None,
            token_mint: option.token().map(str::to_owned),
            token_decimals: Some(option.required_decimals),
        }),
    }
}
