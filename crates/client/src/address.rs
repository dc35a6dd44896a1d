//! Address syntax and EIP-55 checksum validation.

use crate::CallError;
use alloy_primitives::Address;

/// Parse `input` into an [`Address`].
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase input is taken as is; mixed-case input must carry a valid
/// EIP-55 checksum.
pub fn normalize_address(input: &str) -> Result<Address, CallError> {
    let invalid = || CallError::InvalidAddress(input.to_string());

    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let address: Address = digits.parse().map_err(|_| invalid())?;

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let checksummed = address.to_checksum(None);
        if &checksummed[2..] != digits {
            return Err(invalid());
        }
    }

    Ok(address)
}

pub fn is_valid_address(input: &str) -> bool {
    normalize_address(input).is_ok()
}
