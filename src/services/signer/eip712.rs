//! EIP-712 typed data digest construction.
//!
//! ```text
//! keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))
//! ```
//! Both inputs are 32-byte hashes computed by the caller; the domain
//! separator should bind the chain id and verifying contract.

use alloy::primitives::keccak256;

use crate::{
    constants::{DIGEST_LENGTH, EIP712_PREFIX},
    models::{Digest, SignerError},
    utils::decode_hex,
};

const EIP712_MESSAGE_SIZE: usize = 2 + DIGEST_LENGTH + DIGEST_LENGTH;

fn decode_hash(value: &str, field_name: &str) -> Result<[u8; DIGEST_LENGTH], SignerError> {
    let bytes = decode_hex(value, field_name)?;
    bytes.as_slice().try_into().map_err(|_| {
        SignerError::InvalidInput(format!(
            "Invalid {} length: expected {} bytes, got {}",
            field_name,
            DIGEST_LENGTH,
            bytes.len()
        ))
    })
}

/// Digest to sign for typed data, from hex-encoded domain separator and
/// struct hash (with or without `0x`).
pub fn construct_eip712_message_hash(
    domain_separator: &str,
    hash_struct_message: &str,
) -> Result<Digest, SignerError> {
    let domain_separator = decode_hash(domain_separator, "domain separator")?;
    let hash_struct = decode_hash(hash_struct_message, "hash struct message")?;

    let mut eip712_message = [0u8; EIP712_MESSAGE_SIZE];
    eip712_message[0..2].copy_from_slice(&EIP712_PREFIX);
    eip712_message[2..34].copy_from_slice(&domain_separator);
    eip712_message[34..66].copy_from_slice(&hash_struct);

    Ok(Digest::from(keccak256(eip712_message)))
}
