//! Parsing of JSON-RPC hex quantities.
//!
//! Quantities are parsed into `u64`. Values above `u64::MAX` are rejected
//! with [`HexError::Overflow`] rather than widened; callers that need more
//! headroom widen the parsed value before doing arithmetic on it.

/// Error parsing a `0x`-prefixed hex quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    #[error("missing 0x prefix in {0:?}")]
    MissingPrefix(String),
    #[error("invalid hex quantity {0:?}")]
    InvalidDigits(String),
    #[error("hex quantity {0:?} exceeds 64 bits")]
    Overflow(String),
}

/// Parse a `0x`-prefixed hex string as an unsigned 64-bit integer.
pub fn hex_to_u64(s: &str) -> Result<u64, HexError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| HexError::MissingPrefix(s.to_string()))?;

    // from_str_radix would accept a leading sign
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigits(s.to_string()));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 16 {
        return Err(HexError::Overflow(s.to_string()));
    }
    if significant.is_empty() {
        return Ok(0);
    }

    u64::from_str_radix(significant, 16).map_err(|_| HexError::InvalidDigits(s.to_string()))
}
