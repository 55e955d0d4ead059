//! Core types for agent-side x402 payment handling.
//!
//! This crate provides the pure, I/O-free building blocks used when an agent
//! encounters an HTTP 402 Payment Required challenge: decoding the challenge,
//! converting human-readable token amounts to raw on-chain units, resolving
//! network identifiers to chain identities, and encoding the fixed-selector
//! token calldata handed to a remote wallet service.
//!
//! The HTTP side of the flow (URL safety checks, the wallet gateway client,
//! and the payment orchestration itself) lives in the `a402-http` crate.
//!
//! # Modules
//!
//! - [`amount`] - Exact decimal ⇄ raw-unit conversion for token amounts
//! - [`chain`] - Chain identity resolution and family classification
//! - [`networks`] - Registry of well-known networks and token deployments
//! - [`abi`] - Fixed-selector ERC-20 and wrapped-native calldata
//! - [`proto`] - x402 wire format: payment challenges and payment proofs

pub mod abi;
pub mod amount;
pub mod chain;
pub mod networks;
pub mod proto;
