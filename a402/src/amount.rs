//! Exact decimal ⇄ raw-unit conversion for token amounts.
//!
//! Token amounts cross two representations: the human-readable decimal string
//! an agent sees (`"0.1"`) and the raw integer denomination a chain settles in
//! (`"100000"` at 6 decimals). Conversion here is pure string and [`U256`]
//! arithmetic; floating point is never involved, so no precision is lost.
//!
//! Excess fractional digits are truncated, not rounded: a payer must never be
//! charged more than the amount displayed.

use std::sync::LazyLock;

use alloy_primitives::U256;
use regex::Regex;

/// Shape of an acceptable human-decimal amount: unsigned, no exponent.
static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));

/// An amount string that cannot be converted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAmountError {
    /// The input does not match `^\d+(\.\d+)?$` (sign, exponent, or garbage).
    #[error("invalid decimal amount {0:?}")]
    Format(String),
    /// The raw-unit string contains non-digit characters or is empty.
    #[error("invalid raw unit string {0:?}")]
    RawFormat(String),
    /// The value does not fit in 256 bits.
    #[error("amount {0:?} exceeds 256 bits")]
    Overflow(String),
}

/// Converts a human-decimal amount to raw units as a [`U256`].
///
/// The fractional part is truncated to `decimals` digits and zero-padded if
/// shorter, then concatenated with the integer part.
///
/// # Errors
///
/// Returns [`InvalidAmountError`] if `amount` violates the decimal-string
/// invariant or the scaled value exceeds 256 bits.
pub fn to_raw(amount: &str, decimals: u8) -> Result<U256, InvalidAmountError> {
    if !DECIMAL_RE.is_match(amount) {
        return Err(InvalidAmountError::Format(amount.to_owned()));
    }
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    let width = usize::from(decimals);
    let mut frac = frac.to_owned();
    frac.truncate(width);
    while frac.len() < width {
        frac.push('0');
    }
    let digits = format!("{whole}{frac}");
    let digits = match digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    U256::from_str_radix(digits, 10).map_err(|_| InvalidAmountError::Overflow(amount.to_owned()))
}

/// Converts a human-decimal amount to a raw-unit integer string.
///
/// # Errors
///
/// Same failure modes as [`to_raw`].
pub fn to_raw_units(amount: &str, decimals: u8) -> Result<String, InvalidAmountError> {
    to_raw(amount, decimals).map(|v| v.to_string())
}

/// Converts a raw-unit integer string back to a human-decimal amount.
///
/// The raw value is left-padded to at least `decimals + 1` digits and split
/// into whole and fractional parts. Trailing fractional zeros are stripped,
/// but at least one fractional digit is always kept (`"1.0"`, never `"1"`).
///
/// This is the exact inverse of [`to_raw_units`] for any value round-tripped
/// at the same `decimals`.
///
/// # Errors
///
/// Returns [`InvalidAmountError`] if `raw` is empty, contains non-digit
/// characters, or exceeds 256 bits.
pub fn from_raw_units(raw: &str, decimals: u8) -> Result<String, InvalidAmountError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidAmountError::RawFormat(raw.to_owned()));
    }
    U256::from_str_radix(raw, 10).map_err(|_| InvalidAmountError::Overflow(raw.to_owned()))?;
    let digits = match raw.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let width = usize::from(decimals) + 1;
    let padded = format!("{digits:0>width$}");
    let split = padded.len() - usize::from(decimals);
    let whole = &padded[..split];
    let frac = match padded[split..].trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    Ok(format!("{whole}.{frac}"))
}
