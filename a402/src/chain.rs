//! Chain identity resolution and family classification.
//!
//! A network can be named three ways in a payment challenge: a short name
//! (`"base"`), a CAIP-2 identifier (`"eip155:8453"`,
//! `"solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"`), or a bare decimal chain id
//! (`"8453"`). [`resolve`] normalizes all three to a [`ChainIdentity`].
//!
//! The family tag decides the downstream payment strategy: EVM chains take
//! calldata built by [`crate::abi`], account-based chains take token identity
//! fields the wallet service turns into a native instruction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::networks;

/// CAIP-2 namespace for EVM chains.
pub const EIP155_NAMESPACE: &str = "eip155";

/// CAIP-2 namespace for Solana chains.
pub const SOLANA_NAMESPACE: &str = "solana";

/// The execution-model family a chain belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainFamily {
    /// EVM chains: token payments are ABI calldata against a contract.
    Evm,
    /// Account-based chains (Solana-style): token payments are native
    /// instructions constructed by the wallet service.
    AccountBased,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evm => write!(f, "evm"),
            Self::AccountBased => write!(f, "account-based"),
        }
    }
}

/// A resolved chain: internal numeric id plus family tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainIdentity {
    /// Internal chain id (EIP-155 id for EVM chains, cluster id otherwise).
    pub id: u64,
    /// Execution-model family.
    pub family: ChainFamily,
}

impl ChainIdentity {
    /// Builds an identity from a numeric id, classifying its family by
    /// membership in the static account-based chain set.
    #[must_use]
    pub fn from_id(id: u64) -> Self {
        let family = if networks::is_account_based(id) {
            ChainFamily::AccountBased
        } else {
            ChainFamily::Evm
        };
        Self { id, family }
    }
}

impl fmt::Display for ChainIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.family)
    }
}

/// The identifier matched no known network, CAIP-2 form, or numeric id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unresolvable chain identifier {identifier:?}")]
pub struct UnresolvedChainError {
    /// The identifier as supplied by the caller or challenge.
    pub identifier: String,
}

impl UnresolvedChainError {
    /// Creates a new error for the given identifier.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// Resolves a textual network identifier to a [`ChainIdentity`].
///
/// Resolution order:
///
/// 1. Case-insensitive short-name lookup (`"base"` → 8453)
/// 2. CAIP-2 `namespace:reference` — `eip155` references parse as decimal
///    chain ids, `solana` references match the genesis-prefix table
/// 3. The whole identifier as a bare positive decimal integer
///
/// Total over all inputs: malformed identifiers return
/// [`UnresolvedChainError`], never panic.
///
/// # Errors
///
/// Returns [`UnresolvedChainError`] when no rule matches.
pub fn resolve(identifier: &str) -> Result<ChainIdentity, UnresolvedChainError> {
    let trimmed = identifier.trim();

    if let Some(id) = networks::chain_id_by_name(trimmed) {
        return Ok(ChainIdentity::from_id(id));
    }

    if let Some((namespace, reference)) = trimmed.split_once(':') {
        let id = match namespace.to_ascii_lowercase().as_str() {
            EIP155_NAMESPACE => reference.parse::<u64>().ok().filter(|id| *id > 0),
            SOLANA_NAMESPACE => networks::solana_cluster_by_genesis(reference),
            _ => None,
        };
        return id
            .map(ChainIdentity::from_id)
            .ok_or_else(|| UnresolvedChainError::new(identifier));
    }

    trimmed
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .map(ChainIdentity::from_id)
        .ok_or_else(|| UnresolvedChainError::new(identifier))
}
