//! ASN.1/DER decoding for KMS payloads.
//!
//! KMS backends hand back two DER structures:
//!
//! - ECDSA signatures, a `SEQUENCE { r INTEGER, s INTEGER }` (RFC 3279 §2.2.3)
//! - public keys, an X.509 `SubjectPublicKeyInfo` (RFC 5480 §2)
//!
//! Signatures are canonicalized to the low-S form required by EIP-2 while they
//! are decoded, so anything leaving this module is safe to feed to recovery.

use alloy::primitives::U256;
use simple_asn1::{from_der, ASN1Block};

use crate::constants::{
    RAW_PUBLIC_KEY_LENGTH, SECP256K1_HALF_N, SECP256K1_N, UNCOMPRESSED_POINT_MARKER,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerError {
    #[error("ASN.1 parse error: {0}")]
    Asn1(String),
    #[error("Unexpected ASN.1 structure: {0}")]
    Schema(String),
    #[error("Integer out of range: {0}")]
    OutOfRange(String),
}

/// `(r, s)` pair decoded from DER, with `s` already in low-S form.
///
/// Both values are minimal big-endian buffers (no leading zero bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSignature {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
}

fn parse_single_block(der: &[u8]) -> Result<ASN1Block, DerError> {
    let mut blocks = from_der(der).map_err(|e| DerError::Asn1(e.to_string()))?;
    if blocks.len() != 1 {
        return Err(DerError::Schema(format!(
            "expected a single top-level block, got {}",
            blocks.len()
        )));
    }
    Ok(blocks.remove(0))
}

/// Reads an ASN.1 INTEGER as an unsigned 256-bit value.
fn integer_to_u256(block: &ASN1Block, name: &str) -> Result<U256, DerError> {
    let ASN1Block::Integer(_, value) = block else {
        return Err(DerError::Schema(format!("{name} is not an INTEGER")));
    };

    let bytes = value.to_signed_bytes_be();
    if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        return Err(DerError::OutOfRange(format!("{name} is negative")));
    }

    U256::try_from_be_slice(&bytes)
        .ok_or_else(|| DerError::OutOfRange(format!("{name} does not fit in 256 bits")))
}

/// Decodes a DER ECDSA signature into canonical `(r, s)`.
///
/// If `s > N/2` it is replaced by `N - s`, the equivalent low-S signature.
pub fn decode_der_signature(der: &[u8]) -> Result<CanonicalSignature, DerError> {
    let ASN1Block::Sequence(_, items) = parse_single_block(der)? else {
        return Err(DerError::Schema("signature is not a SEQUENCE".to_string()));
    };

    let [r_block, s_block] = items.as_slice() else {
        return Err(DerError::Schema(format!(
            "signature SEQUENCE must hold exactly two INTEGERs, got {} items",
            items.len()
        )));
    };

    let r = integer_to_u256(r_block, "r")?;
    let mut s = integer_to_u256(s_block, "s")?;

    for (name, value) in [("r", r), ("s", s)] {
        if value.is_zero() || value >= SECP256K1_N {
            return Err(DerError::OutOfRange(format!(
                "{name} must be in [1, N - 1]"
            )));
        }
    }

    if s > SECP256K1_HALF_N {
        s = SECP256K1_N - s;
    }

    Ok(CanonicalSignature {
        r: r.to_be_bytes_trimmed_vec(),
        s: s.to_be_bytes_trimmed_vec(),
    })
}

/// Extracts the raw 64-byte `X ‖ Y` point from a DER `SubjectPublicKeyInfo`.
pub fn extract_public_key_from_der(der: &[u8]) -> Result<[u8; 64], DerError> {
    let ASN1Block::Sequence(_, items) = parse_single_block(der)? else {
        return Err(DerError::Schema(
            "SubjectPublicKeyInfo is not a SEQUENCE".to_string(),
        ));
    };

    let [ASN1Block::Sequence(_, algorithm), ASN1Block::BitString(_, _, key_bytes)] =
        items.as_slice()
    else {
        return Err(DerError::Schema(
            "expected SEQUENCE { AlgorithmIdentifier, BIT STRING }".to_string(),
        ));
    };

    if !matches!(algorithm.first(), Some(ASN1Block::ObjectIdentifier(_, _))) {
        return Err(DerError::Schema(
            "AlgorithmIdentifier does not start with an OID".to_string(),
        ));
    }

    match key_bytes.split_first() {
        Some((&UNCOMPRESSED_POINT_MARKER, point)) if point.len() == RAW_PUBLIC_KEY_LENGTH => {
            let mut out = [0u8; RAW_PUBLIC_KEY_LENGTH];
            out.copy_from_slice(point);
            Ok(out)
        }
        _ => Err(DerError::Schema(format!(
            "expected a 65-byte uncompressed point, got {} bytes",
            key_bytes.len()
        ))),
    }
}
