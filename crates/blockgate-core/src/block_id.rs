//! Block identifier normalization.
//!
//! Routing layers call [`normalize`] on user input before handing the
//! identifier to a [`crate::BlockchainClient`], which only ever receives a
//! block tag or a `0x`-prefixed hex quantity.

use crate::error::{GatewayError, GatewayResult};

/// Block tags understood by `eth_getBlockByNumber`.
pub const BLOCK_TAGS: &[&str] = &["latest", "earliest", "pending", "safe", "finalized"];

/// Normalize a user-supplied block identifier.
///
/// - a block tag is forwarded verbatim
/// - `0x`-prefixed hex is validated and stripped of leading zeros
/// - a decimal numeral is converted to `0x`-prefixed lowercase hex
pub fn normalize(input: &str) -> GatewayResult<String> {
    let trimmed = input.trim();

    if BLOCK_TAGS.contains(&trimmed) {
        return Ok(trimmed.to_string());
    }

    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            let significant = digits.trim_start_matches('0');
            let significant = if significant.is_empty() { "0" } else { significant };
            return Ok(format!("0x{significant}"));
        }
        return Err(invalid(input));
    }

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return trimmed
            .parse::<u64>()
            .map(|n| format!("0x{n:x}"))
            .map_err(|e| invalid(input).with_source(e));
    }

    Err(invalid(input))
}

fn invalid(input: &str) -> GatewayError {
    GatewayError::validation("Invalid block number format").with_context("input", input)
}
