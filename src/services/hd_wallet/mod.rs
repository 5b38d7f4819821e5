//! # Local HD Derivation Backend
//!
//! Derives secp256k1 private keys from a BIP39 mnemonic along BIP32 paths.
//! Key ids are paths relative to the Ethereum BIP44 prefix `m/44'/60'/`
//! (e.g. `0'/0/1`); ids starting with `m/` are absolute.
//!
//! The seed is the only retained secret and is wiped on drop.

use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use log::debug;
use serde::Serialize;
use zeroize::Zeroizing;

#[cfg(test)]
use mockall::automock;

use crate::{constants::ETH_DERIVATION_BASE_PATH, models::SignerError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum HdWalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("Invalid derivation path '{0}'")]
    InvalidPath(String),
    #[error("Key derivation failed: {0}")]
    DerivationError(String),
}

impl From<HdWalletError> for SignerError {
    fn from(error: HdWalletError) -> Self {
        match error {
            HdWalletError::InvalidMnemonic(_) => SignerError::InvalidInput(error.to_string()),
            HdWalletError::InvalidPath(_) | HdWalletError::DerivationError(_) => {
                SignerError::InvalidPath(error.to_string())
            }
        }
    }
}

#[cfg_attr(test, automock)]
pub trait LocalDerivationBackend: Send + Sync {
    /// Private scalar at `path`.
    fn derive_private_key(&self, path: &str) -> Result<Zeroizing<[u8; 32]>, HdWalletError>;
}

/// Expands a key id into an absolute BIP32 path.
pub fn resolve_derivation_path(key_id: &str) -> Result<DerivationPath, HdWalletError> {
    let key_id = key_id.trim();
    let full_path = if key_id.starts_with("m/") || key_id == "m" {
        key_id.to_string()
    } else {
        format!("{ETH_DERIVATION_BASE_PATH}{key_id}")
    };

    full_path
        .parse::<DerivationPath>()
        .map_err(|_| HdWalletError::InvalidPath(key_id.to_string()))
}

pub struct MnemonicKeyDeriver {
    seed: Zeroizing<[u8; 64]>,
}

impl MnemonicKeyDeriver {
    pub fn new(phrase: &str, passphrase: &str) -> Result<Self, HdWalletError> {
        let mnemonic = Mnemonic::parse_normalized(phrase.trim())
            .map_err(|e| HdWalletError::InvalidMnemonic(e.to_string()))?;

        Ok(Self {
            seed: Zeroizing::new(mnemonic.to_seed(passphrase)),
        })
    }
}

impl std::fmt::Debug for MnemonicKeyDeriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MnemonicKeyDeriver").finish_non_exhaustive()
    }
}

impl LocalDerivationBackend for MnemonicKeyDeriver {
    fn derive_private_key(&self, path: &str) -> Result<Zeroizing<[u8; 32]>, HdWalletError> {
        let derivation_path = resolve_derivation_path(path)?;
        debug!("Deriving key at {}", derivation_path);

        let child = XPrv::derive_from_path(self.seed.as_slice(), &derivation_path)
            .map_err(|e| HdWalletError::DerivationError(e.to_string()))?;

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&child.private_key().to_bytes());
        Ok(key)
    }
}
