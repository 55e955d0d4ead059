//! HTTP transport for agent-side x402 payments.
//!
//! This crate carries the side-effecting half of the payment flow:
//!
//! - [`guard`] - SSRF guard validating outbound target URLs
//! - [`gateway`] - client for the remote custodial wallet service
//! - [`types`] - the inbound/outbound contract of a paid request
//! - [`flow`] - the x402 payment orchestrator state machine
//!
//! A [`flow::PaymentFlow`] issues the caller's request, and when the resource
//! answers 402 Payment Required it parses the challenge, picks an option,
//! enforces the caller's spending cap, settles through the wallet gateway,
//! and retries the request once with an `X-PAYMENT` proof header.
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables `tracing` instrumentation of the flow

pub mod flow;
pub mod gateway;
pub mod guard;
pub mod types;
