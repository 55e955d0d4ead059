//! Fixed-selector ERC-20 and wrapped-native calldata.
//!
//! The payment flow only ever issues five contract calls: ERC-20 `transfer`,
//! `approve`, and `allowance`, plus the wrapped-native `deposit`/`withdraw`
//! pair. They are modeled as a closed enum so a `match` proves every
//! operation has an encoding; no open-ended string building.
//!
//! The encoder knows nothing about gas, signatures, or broadcast — it
//! produces opaque calldata bytes for the wallet gateway's send operation.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, sol};

sol! {
    /// Minimal ERC-20 surface used by the payment flow.
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IERC20 {
        function transfer(address to, uint256 value) external returns (bool);
        function approve(address spender, uint256 value) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }
}

sol! {
    /// Wrapped-native token (WETH-style) wrap/unwrap surface.
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IWrappedNative {
        function deposit() external payable;
        function withdraw(uint256 value) external;
    }
}

/// The unlimited-approval value, `2^256 - 1`.
pub const MAX_APPROVAL: U256 = U256::MAX;

/// One of the fixed contract operations the payment flow can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCall {
    /// ERC-20 `transfer(address,uint256)`.
    Transfer {
        /// Recipient of the tokens.
        to: Address,
        /// Amount in raw units.
        value: U256,
    },
    /// ERC-20 `approve(address,uint256)`.
    Approve {
        /// Spender being approved.
        spender: Address,
        /// Allowance in raw units; use [`MAX_APPROVAL`] for unlimited.
        value: U256,
    },
    /// ERC-20 `allowance(address,address)`.
    Allowance {
        /// Token owner.
        owner: Address,
        /// Approved spender.
        spender: Address,
    },
    /// Wrapped-native `deposit()` — wraps the attached native value.
    Deposit,
    /// Wrapped-native `withdraw(uint256)` — unwraps back to native.
    Withdraw {
        /// Amount in raw units.
        value: U256,
    },
}

impl TokenCall {
    /// Encodes the call as 4-byte-selector + ABI-encoded arguments.
    #[must_use]
    pub fn calldata(&self) -> Vec<u8> {
        match *self {
            Self::Transfer { to, value } => IERC20::transferCall { to, value }.abi_encode(),
            Self::Approve { spender, value } => {
                IERC20::approveCall { spender, value }.abi_encode()
            }
            Self::Allowance { owner, spender } => {
                IERC20::allowanceCall { owner, spender }.abi_encode()
            }
            Self::Deposit => IWrappedNative::depositCall {}.abi_encode(),
            Self::Withdraw { value } => IWrappedNative::withdrawCall { value }.abi_encode(),
        }
    }

    /// Returns the 4-byte function selector for this operation.
    #[must_use]
    pub const fn selector(&self) -> [u8; 4] {
        match self {
            Self::Transfer { .. } => IERC20::transferCall::SELECTOR,
            Self::Approve { .. } => IERC20::approveCall::SELECTOR,
            Self::Allowance { .. } => IERC20::allowanceCall::SELECTOR,
            Self::Deposit => IWrappedNative::depositCall::SELECTOR,
            Self::Withdraw { .. } => IWrappedNative::withdrawCall::SELECTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, hex};

    #[test]
    fn test_selectors_match_canonical_signatures() {
        let to = Address::ZERO;
        let value = U256::ZERO;
        assert_eq!(TokenCall::Transfer { to, value }.selector(), hex!("a9059cbb"));
        assert_eq!(
            TokenCall::Approve { spender: to, value }.selector(),
            hex!("095ea7b3")
        );
        assert_eq!(
            TokenCall::Allowance { owner: to, spender: to }.selector(),
            hex!("dd62ed3e")
        );
        assert_eq!(TokenCall::Deposit.selector(), hex!("d0e30db0"));
        assert_eq!(TokenCall::Withdraw { value }.selector(), hex!("2e1a7d4d"));
    }

    #[test]
    fn test_transfer_calldata_layout() {
        let call = TokenCall::Transfer {
            to: address!("1111111111111111111111111111111111111111"),
            value: U256::from(1u64),
        };
        let encoded = hex::encode(call.calldata());
        assert_eq!(
            encoded,
            "a9059cbb\
             0000000000000000000000001111111111111111111111111111111111111111\
             0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_max_approval_encodes_all_ones() {
        let call = TokenCall::Approve {
            spender: address!("2222222222222222222222222222222222222222"),
            value: MAX_APPROVAL,
        };
        let encoded = hex::encode(call.calldata());
        assert!(encoded.ends_with(&"f".repeat(64)));
        assert_eq!(encoded.len(), 8 + 64 + 64);
    }

    #[test]
    fn test_deposit_is_selector_only() {
        assert_eq!(TokenCall::Deposit.calldata().len(), 4);
    }

    #[test]
    fn test_withdraw_calldata_layout() {
        let call = TokenCall::Withdraw { value: U256::from(5u64) };
        let encoded = hex::encode(call.calldata());
        assert_eq!(
            encoded,
            "2e1a7d4d0000000000000000000000000000000000000000000000000000000000000005"
        );
    }
}
