//! Ethereum-shaped ECDSA signature.
use alloy::primitives::{PrimitiveSignature, U256};
use serde::Serialize;

use crate::{
    models::SignerError,
    utils::{encode_hex_prefixed, left_pad, recovery_bit},
};

/// `(r, s, v)` produced by a wallet.
///
/// `s` is always in low-S form. `v` is `27/28`, or `chain_id * 2 + 35/36`
/// when the signature was produced for an EIP-155 chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EcdsaSignature {
    #[serde(serialize_with = "serialize_hex")]
    pub r: [u8; 32],
    #[serde(serialize_with = "serialize_hex")]
    pub s: [u8; 32],
    pub v: u64,
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode_hex_prefixed(bytes))
}

impl EcdsaSignature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u64) -> Self {
        Self { r, s, v }
    }

    /// Builds a signature from minimal big-endian `r` and `s` buffers.
    pub fn from_parts(r: &[u8], s: &[u8], v: u64) -> Result<Self, SignerError> {
        let r = left_pad::<32>(r)
            .ok_or_else(|| SignerError::InvalidInput("r exceeds 32 bytes".to_string()))?;
        let s = left_pad::<32>(s)
            .ok_or_else(|| SignerError::InvalidInput("s exceeds 32 bytes".to_string()))?;
        Ok(Self { r, s, v })
    }

    /// Parity of the recovered point, given the chain the `v` was encoded for.
    pub fn y_parity(&self, chain_id: Option<u64>) -> Result<bool, SignerError> {
        Ok(recovery_bit(self.v, chain_id)? == 1)
    }

    /// `v` in minimal big-endian form, at least one byte long.
    pub fn v_bytes(&self) -> Vec<u8> {
        let bytes = self.v.to_be_bytes();
        let first = bytes
            .iter()
            .position(|b| *b != 0)
            .unwrap_or(bytes.len() - 1);
        bytes[first..].to_vec()
    }

    /// `r (32) ‖ s (32) ‖ v (minimal)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.v_bytes();
        let mut out = Vec::with_capacity(64 + v.len());
        out.extend_from_slice(&self.r);
        out.extend_from_slice(&self.s);
        out.extend_from_slice(&v);
        out
    }

    pub fn to_hex(&self) -> String {
        encode_hex_prefixed(self.to_bytes())
    }

    /// Converts into alloy's parity-based signature for transaction encoding.
    pub fn to_primitive(&self, chain_id: Option<u64>) -> Result<PrimitiveSignature, SignerError> {
        Ok(PrimitiveSignature::new(
            U256::from_be_bytes(self.r),
            U256::from_be_bytes(self.s),
            self.y_parity(chain_id)?,
        ))
    }
}
