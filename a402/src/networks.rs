//! Registry of well-known networks and token deployments.
//!
//! Static, immutable lookup tables consumed by the chain resolver and the
//! contract call encoder: short network names, CAIP-2 Solana genesis
//! references, the account-based cluster set, and wrapped-native token
//! deployments per chain. None of this requires locking.

use alloy_primitives::{Address, address};

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: u64 = 1;

/// Ethereum Sepolia (testnet) chain ID.
pub const ETHEREUM_SEPOLIA: u64 = 11155111;

/// Base Mainnet chain ID.
pub const BASE_MAINNET: u64 = 8453;

/// Base Sepolia (testnet) chain ID.
pub const BASE_SEPOLIA: u64 = 84532;

/// Polygon Mainnet chain ID.
pub const POLYGON_MAINNET: u64 = 137;

/// Polygon Amoy (testnet) chain ID.
pub const POLYGON_AMOY: u64 = 80002;

/// Avalanche C-Chain chain ID.
pub const AVALANCHE_MAINNET: u64 = 43114;

/// Avalanche Fuji (testnet) chain ID.
pub const AVALANCHE_FUJI: u64 = 43113;

/// Optimism Mainnet chain ID.
pub const OPTIMISM_MAINNET: u64 = 10;

/// Arbitrum One chain ID.
pub const ARBITRUM_ONE: u64 = 42161;

/// Internal id assigned to the Solana mainnet-beta cluster.
pub const SOLANA_MAINNET: u64 = 101;

/// Internal id assigned to the Solana testnet cluster.
pub const SOLANA_TESTNET: u64 = 102;

/// Internal id assigned to the Solana devnet cluster.
pub const SOLANA_DEVNET: u64 = 103;

/// A known network: human-readable short name plus its internal chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkEntry {
    /// Short network name (e.g., "base", "solana-devnet").
    pub name: &'static str,
    /// Internal chain id.
    pub chain_id: u64,
}

/// Short-name lookup table. Names are matched case-insensitively.
pub static KNOWN_NETWORKS: &[NetworkEntry] = &[
    NetworkEntry { name: "ethereum", chain_id: ETHEREUM_MAINNET },
    NetworkEntry { name: "sepolia", chain_id: ETHEREUM_SEPOLIA },
    NetworkEntry { name: "base", chain_id: BASE_MAINNET },
    NetworkEntry { name: "base-sepolia", chain_id: BASE_SEPOLIA },
    NetworkEntry { name: "polygon", chain_id: POLYGON_MAINNET },
    NetworkEntry { name: "polygon-amoy", chain_id: POLYGON_AMOY },
    NetworkEntry { name: "avalanche", chain_id: AVALANCHE_MAINNET },
    NetworkEntry { name: "avalanche-fuji", chain_id: AVALANCHE_FUJI },
    NetworkEntry { name: "optimism", chain_id: OPTIMISM_MAINNET },
    NetworkEntry { name: "arbitrum", chain_id: ARBITRUM_ONE },
    NetworkEntry { name: "solana", chain_id: SOLANA_MAINNET },
    NetworkEntry { name: "solana-testnet", chain_id: SOLANA_TESTNET },
    NetworkEntry { name: "solana-devnet", chain_id: SOLANA_DEVNET },
];

/// CAIP-2 Solana genesis-hash references mapped to internal cluster ids.
///
/// CAIP-2 truncates the base58 genesis hash to 32 characters; entries store
/// that truncated form and match as a prefix, so full genesis hashes resolve
/// as well.
pub static SOLANA_GENESIS_REFERENCES: &[(&str, u64)] = &[
    ("5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp", SOLANA_MAINNET),
    ("4uhcVJyU9pJkvQyS88uRDiswHXSCkY3z", SOLANA_TESTNET),
    ("EtWTRABZaYq6iMfeYKouRu166VU2xqa1", SOLANA_DEVNET),
];

/// Internal ids of account-based (non-EVM) chains.
pub static ACCOUNT_BASED_CHAINS: &[u64] = &[SOLANA_MAINNET, SOLANA_TESTNET, SOLANA_DEVNET];

/// Wrapped-native token (WETH-style) deployment addresses per EVM chain.
static WRAPPED_NATIVE_TOKENS: &[(u64, Address)] = &[
    (ETHEREUM_MAINNET, address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")),
    (ETHEREUM_SEPOLIA, address!("fFf9976782d46CC05630D1f6eBAb18b2324d6B14")),
    // OP-stack chains predeploy the wrapped native token at 0x4200...0006.
    (BASE_MAINNET, address!("4200000000000000000000000000000000000006")),
    (BASE_SEPOLIA, address!("4200000000000000000000000000000000000006")),
    (OPTIMISM_MAINNET, address!("4200000000000000000000000000000000000006")),
    (POLYGON_MAINNET, address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270")),
    (AVALANCHE_MAINNET, address!("B31f66AA3C1e785363F0875A1B74E27b85FD66c7")),
    (ARBITRUM_ONE, address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1")),
];

/// Looks up a chain id by its short network name (case-insensitive).
#[must_use]
pub fn chain_id_by_name(name: &str) -> Option<u64> {
    let name = name.to_ascii_lowercase();
    KNOWN_NETWORKS
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.chain_id)
}

/// Resolves a CAIP-2 Solana genesis reference to an internal cluster id.
#[must_use]
pub fn solana_cluster_by_genesis(reference: &str) -> Option<u64> {
    SOLANA_GENESIS_REFERENCES
        .iter()
        .find(|(genesis, _)| reference.starts_with(genesis))
        .map(|(_, id)| *id)
}

/// Returns `true` if the chain id belongs to an account-based (non-EVM) chain.
#[must_use]
pub fn is_account_based(chain_id: u64) -> bool {
    ACCOUNT_BASED_CHAINS.contains(&chain_id)
}

/// Returns the wrapped-native token deployment for an EVM chain, if known.
#[must_use]
pub fn wrapped_native_token(chain_id: u64) -> Option<Address> {
    WRAPPED_NATIVE_TOKENS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, addr)| *addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_by_name() {
        assert_eq!(chain_id_by_name("base"), Some(BASE_MAINNET));
        assert_eq!(chain_id_by_name("Base"), Some(BASE_MAINNET));
        assert_eq!(chain_id_by_name("solana"), Some(SOLANA_MAINNET));
        assert_eq!(chain_id_by_name("unknown"), None);
    }

    #[test]
    fn test_solana_cluster_by_genesis_prefix() {
        // Truncated CAIP-2 reference.
        assert_eq!(
            solana_cluster_by_genesis("5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"),
            Some(SOLANA_MAINNET)
        );
        // Full genesis hash extends past the stored 32-character prefix.
        assert_eq!(
            solana_cluster_by_genesis("5eykt4UsFv8P8NJdTREpY1vzqKqZKvdpBnN9pXXX"),
            Some(SOLANA_MAINNET)
        );
        assert_eq!(solana_cluster_by_genesis(""), None);
        assert_eq!(solana_cluster_by_genesis("nonsense"), None);
        // A bare prefix of the stored reference is not enough.
        assert_eq!(solana_cluster_by_genesis("5eykt4"), None);
    }

    #[test]
    fn test_family_membership() {
        assert!(is_account_based(SOLANA_DEVNET));
        assert!(!is_account_based(BASE_MAINNET));
    }

    #[test]
    fn test_wrapped_native_token() {
        assert_eq!(
            wrapped_native_token(BASE_MAINNET),
            Some(address!("4200000000000000000000000000000000000006"))
        );
        assert_eq!(wrapped_native_token(SOLANA_MAINNET), None);
    }
}
