//! Curve and protocol constants shared across the crate.
use alloy::primitives::{uint, U256};

/// Order `N` of the secp256k1 group.
pub const SECP256K1_N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// `N / 2`, the upper bound for a canonical (low-S) `s` value (EIP-2).
pub const SECP256K1_HALF_N: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// Legacy (pre EIP-155) recovery id offset.
pub const LEGACY_V_OFFSET: u64 = 27;

/// EIP-155 recovery id offset, applied on top of `chain_id * 2`.
pub const EIP155_V_OFFSET: u64 = 35;

/// BIP44 prefix for Ethereum keys (`purpose' / coin_type'`).
pub const ETH_DERIVATION_BASE_PATH: &str = "m/44'/60'/";

/// Default account used when a derivation identifier omits it.
pub const DEFAULT_DERIVATION_ACCOUNT: u32 = 0;

/// First hardened BIP32 child index; path components must stay below it.
pub const BIP32_HARDENED_OFFSET: u32 = 0x8000_0000;

/// Length of a raw uncompressed public key without the `0x04` marker.
pub const RAW_PUBLIC_KEY_LENGTH: usize = 64;

/// Marker byte of an uncompressed SEC1 point.
pub const UNCOMPRESSED_POINT_MARKER: u8 = 0x04;

pub const DIGEST_LENGTH: usize = 32;

/// EIP-712 message prefix
pub const EIP712_PREFIX: [u8; 2] = [0x19, 0x01];

/// Default Google Cloud KMS API domain
pub const GOOGLE_CLOUD_DEFAULT_UNIVERSE_DOMAIN: &str = "googleapis.com";
