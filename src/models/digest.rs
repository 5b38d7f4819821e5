use std::str::FromStr;

use crate::{
    constants::DIGEST_LENGTH,
    models::SignerError,
    utils::{decode_hex, encode_hex_prefixed},
};

/// 32-byte hash handed to a wallet for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; DIGEST_LENGTH]);

impl Digest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignerError> {
        let digest: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|_| {
            SignerError::InvalidInput(format!(
                "Invalid digest length: expected {} bytes, got {}",
                DIGEST_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self(digest))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_hex_prefixed(self.0)
    }
}

impl FromStr for Digest {
    type Err = SignerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_slice(&decode_hex(value, "digest")?)
    }
}

impl From<[u8; DIGEST_LENGTH]> for Digest {
    fn from(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<alloy::primitives::B256> for Digest {
    fn from(hash: alloy::primitives::B256) -> Self {
        Self(hash.0)
    }
}
