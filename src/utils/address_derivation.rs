//! Derivation of Ethereum addresses from secp256k1 public keys.
//!
//! An address is the last 20 bytes of `keccak256(X ‖ Y)` over the raw 64-byte
//! point. The checksummed form follows EIP-55.

use alloy::primitives::{keccak256, Address};

use crate::constants::RAW_PUBLIC_KEY_LENGTH;

#[derive(Debug, thiserror::Error)]
pub enum AddressDerivationError {
    #[error("Parse Error: {0}")]
    ParseError(String),
}

/// Derive EVM address from a raw 64-byte public key.
pub fn derive_ethereum_address(public_key: &[u8]) -> Result<Address, AddressDerivationError> {
    if public_key.len() != RAW_PUBLIC_KEY_LENGTH {
        return Err(AddressDerivationError::ParseError(format!(
            "Invalid public key length: expected {} bytes, got {}",
            RAW_PUBLIC_KEY_LENGTH,
            public_key.len()
        )));
    }

    let mut raw = [0u8; RAW_PUBLIC_KEY_LENGTH];
    raw.copy_from_slice(public_key);
    Ok(public_key_to_address(&raw))
}

/// Address of a raw 64-byte public key.
pub fn public_key_to_address(public_key: &[u8; RAW_PUBLIC_KEY_LENGTH]) -> Address {
    let hash = keccak256(public_key);

    // Take the last 20 bytes of the hash
    Address::from_slice(&hash[hash.len() - 20..])
}

/// EIP-55 mixed-case hex form of an address.
pub fn to_checksum_address(address: &Address) -> String {
    address.to_checksum(None)
}

/// Lowercase `0x` hex form of an address.
pub fn to_address_hex(address: &Address) -> String {
    format!("{address:#x}")
}
