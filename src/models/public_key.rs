//! Uncompressed secp256k1 public key value.
use std::fmt;

use alloy::primitives::Address;
use k256::ecdsa::SigningKey;

use crate::{
    constants::RAW_PUBLIC_KEY_LENGTH,
    models::SignerError,
    utils::{
        decode_hex, extract_public_key_from_der, public_key_to_address, recover_public_key,
        to_address_hex, to_checksum_address,
    },
};

/// Raw 64-byte `X ‖ Y` curve point, without the `0x04` marker.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; RAW_PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Multiplies the curve generator by the private scalar.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, SignerError> {
        let signing_key = SigningKey::from_slice(private_key)
            .map_err(|e| SignerError::InvalidInput(format!("Invalid private key: {e}")))?;
        Ok(Self::from_signing_key(&signing_key))
    }

    pub(crate) fn from_signing_key(signing_key: &SigningKey) -> Self {
        let point = signing_key.verifying_key().to_encoded_point(false);
        let mut raw = [0u8; RAW_PUBLIC_KEY_LENGTH];
        raw.copy_from_slice(&point.as_bytes()[1..]);
        Self(raw)
    }

    pub fn from_raw_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let raw: [u8; RAW_PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            SignerError::InvalidInput(format!(
                "Invalid public key length: expected {} bytes, got {}",
                RAW_PUBLIC_KEY_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }

    /// Accepts hex with or without the `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, SignerError> {
        let bytes = decode_hex(value, "public key")?;
        Self::from_raw_bytes(&bytes)
    }

    /// Parses an X.509 `SubjectPublicKeyInfo`, as returned by KMS backends.
    pub fn from_der(der: &[u8]) -> Result<Self, SignerError> {
        Ok(Self(extract_public_key_from_der(der)?))
    }

    /// ECDSA public key recovery from a full signature.
    ///
    /// `v` must be one of the candidates for `chain_id` (`27/28`, or
    /// `chain_id * 2 + 35/36`).
    pub fn from_recovery(
        digest: &[u8; 32],
        v: u64,
        r: &[u8],
        s: &[u8],
        chain_id: Option<u64>,
    ) -> Result<Self, SignerError> {
        Ok(Self(recover_public_key(digest, v, r, s, chain_id)?))
    }

    pub fn as_bytes(&self) -> &[u8; RAW_PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn to_address(&self) -> Address {
        public_key_to_address(&self.0)
    }

    pub fn to_address_hex(&self) -> String {
        to_address_hex(&self.to_address())
    }

    pub fn to_checksum_address(&self) -> String {
        to_checksum_address(&self.to_address())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(0x{})", hex::encode(self.0))
    }
}
