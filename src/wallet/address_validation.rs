//! Recipient Address Validation
//!
//! Addresses are `0x` followed by 40 hex characters. All-lowercase and
//! all-uppercase forms are accepted as-is; mixed case must carry a valid
//! EIP-55 checksum, which catches most single-character typos.

use crate::error::{OnyxError, OnyxResult};
use crate::types::Address;
use crate::utils::crypto::to_checksum_address;

/// Length of a rendered address including the `0x` prefix
pub const ADDRESS_STRING_LEN: usize = 42;

/// Parse an address string, failing with `InvalidRecipientAddress`
pub fn parse_address(address: &str) -> OnyxResult<Address> {
    let trimmed = address.trim();

    if !trimmed.starts_with("0x") {
        return Err(OnyxError::invalid_recipient("Address must start with 0x")
            .with_details(trimmed.to_string()));
    }
    if trimmed.len() != ADDRESS_STRING_LEN {
        return Err(OnyxError::invalid_recipient(format!(
            "Address must be {} characters, got {}",
            ADDRESS_STRING_LEN,
            trimmed.len()
        )));
    }

    let hex_part = &trimmed[2..];
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(OnyxError::invalid_recipient("Address contains non-hex characters"));
    }

    let bytes = hex::decode(hex_part.to_ascii_lowercase())
        .map_err(|e| OnyxError::invalid_recipient(format!("Address is not valid hex: {}", e)))?;
    let address = Address::from_slice(&bytes)
        .map_err(|e| OnyxError::invalid_recipient(e.message))?;

    if is_mixed_case(hex_part) && to_checksum_address(&bytes) != trimmed {
        return Err(OnyxError::invalid_recipient("Address checksum mismatch"));
    }

    Ok(address)
}

/// Validate a recipient address.
/// Returns (is_valid, checksummed_address)
pub fn validate_recipient(address: &str) -> (bool, Option<String>) {
    match parse_address(address) {
        Ok(parsed) => (true, Some(parsed.to_checksum())),
        Err(_) => (false, None),
    }
}

fn is_mixed_case(hex_part: &str) -> bool {
    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    has_lower && has_upper
}
