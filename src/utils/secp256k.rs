//! Public key recovery and Ethereum recovery id (`v`) resolution.
//!
//! A remote signer only returns `(r, s)`. Of the two points that could have
//! produced `r`, exactly one recovers to the signer's address, so `v` is
//! found by trial recovery against the known address.

use alloy::primitives::Address;
use k256::{
    ecdsa::{RecoveryId, Signature, VerifyingKey},
    FieldBytes,
};
use log::{debug, warn};
use serde::Serialize;

use super::{address_derivation::derive_ethereum_address, codec::left_pad};
use crate::constants::{EIP155_V_OFFSET, LEGACY_V_OFFSET, RAW_PUBLIC_KEY_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum Secp256k1Error {
    #[error("Secp256k1 recovery error: {0}")]
    RecoveryError(String),
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("No recovery id reproduces address {0}")]
    RecoveryFailed(String),
}

/// Base `v` value for a chain: `27`, or `chain_id * 2 + 35` under EIP-155.
fn v_base(chain_id: Option<u64>) -> Result<u64, Secp256k1Error> {
    match chain_id {
        None => Ok(LEGACY_V_OFFSET),
        Some(id) => id
            .checked_mul(2)
            .and_then(|v| v.checked_add(EIP155_V_OFFSET))
            .filter(|v| *v < u64::MAX)
            .ok_or_else(|| {
                Secp256k1Error::InvalidRecoveryId(format!("chain id {id} is too large"))
            }),
    }
}

/// Returns the two `v` candidates for a chain, in trial order.
pub fn recovery_candidates(chain_id: Option<u64>) -> Result<[u64; 2], Secp256k1Error> {
    let base = v_base(chain_id)?;
    Ok([base, base + 1])
}

/// Maps an Ethereum `v` back to the raw recovery bit (0 or 1).
pub fn recovery_bit(v: u64, chain_id: Option<u64>) -> Result<u8, Secp256k1Error> {
    let base = v_base(chain_id)?;
    match v.checked_sub(base) {
        Some(0) => Ok(0),
        Some(1) => Ok(1),
        _ => Err(Secp256k1Error::InvalidRecoveryId(format!(
            "v = {v} is not valid for chain id {chain_id:?}"
        ))),
    }
}

fn signature_from_parts(r: &[u8], s: &[u8]) -> Result<Signature, Secp256k1Error> {
    let r: [u8; 32] = left_pad(r)
        .ok_or_else(|| Secp256k1Error::InvalidSignature("r exceeds 32 bytes".to_string()))?;
    let s: [u8; 32] = left_pad(s)
        .ok_or_else(|| Secp256k1Error::InvalidSignature("s exceeds 32 bytes".to_string()))?;

    Signature::from_scalars(FieldBytes::from(r), FieldBytes::from(s))
        .map_err(|e| Secp256k1Error::InvalidSignature(e.to_string()))
}

/// Recovers the raw 64-byte public key that produced `(r, s)` over `digest`.
pub fn recover_public_key(
    digest: &[u8; 32],
    v: u64,
    r: &[u8],
    s: &[u8],
    chain_id: Option<u64>,
) -> Result<[u8; 64], Secp256k1Error> {
    let bit = recovery_bit(v, chain_id)?;
    let signature = signature_from_parts(r, s)?;
    let rec_id = RecoveryId::from_byte(bit)
        .ok_or_else(|| Secp256k1Error::InvalidRecoveryId(format!("recovery bit {bit}")))?;

    let key = VerifyingKey::recover_from_prehash(digest, &signature, rec_id)
        .map_err(|e| Secp256k1Error::RecoveryError(e.to_string()))?;

    let encoded = key.to_encoded_point(false);
    let bytes = encoded.as_bytes();
    // Skip first byte (0x04 uncompressed point marker)
    if bytes.len() != RAW_PUBLIC_KEY_LENGTH + 1 {
        return Err(Secp256k1Error::RecoveryError(format!(
            "unexpected recovered key length {}",
            bytes.len()
        )));
    }
    let mut out = [0u8; RAW_PUBLIC_KEY_LENGTH];
    out.copy_from_slice(&bytes[1..]);
    Ok(out)
}

/// Finds the `v` for which `(r, s, v)` recovers to `expected_address`.
///
/// Candidates are `27, 28` without a chain id and `chain_id * 2 + 35/36`
/// with one. Fails with [`Secp256k1Error::RecoveryFailed`] when neither
/// candidate matches, which means the signature, digest and address do not
/// belong together.
pub fn resolve_recovery_id(
    expected_address: &Address,
    digest: &[u8; 32],
    r: &[u8],
    s: &[u8],
    chain_id: Option<u64>,
) -> Result<u64, Secp256k1Error> {
    for candidate in recovery_candidates(chain_id)? {
        let recovered = match recover_public_key(digest, candidate, r, s, chain_id) {
            Ok(key) => key,
            Err(e) => {
                debug!("Recovery with v = {} failed: {}", candidate, e);
                continue;
            }
        };

        let address = derive_ethereum_address(&recovered)
            .map_err(|e| Secp256k1Error::RecoveryError(e.to_string()))?;
        if address == *expected_address {
            return Ok(candidate);
        }
    }

    warn!(
        "No recovery id reproduces address {} for digest 0x{}",
        expected_address,
        hex::encode(digest)
    );
    Err(Secp256k1Error::RecoveryFailed(expected_address.to_string()))
}
