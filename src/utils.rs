// Utility helpers

use ethers::types::Address;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Adds a `0x` prefix when missing.
pub fn with_hex_prefix(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        format!("0x{}", &trimmed[2..])
    } else {
        format!("0x{trimmed}")
    }
}

/// Parses a 20-byte hex address, with or without `0x`.
pub fn parse_address(value: &str) -> Result<Address> {
    let normalized = with_hex_prefix(value);
    if normalized.len() != 42 {
        return Err(AppError::BadRequest(format!("Invalid address: {value}")));
    }
    Address::from_str(&normalized)
        .map_err(|e| AppError::BadRequest(format!("Invalid address {value}: {e}")))
}
