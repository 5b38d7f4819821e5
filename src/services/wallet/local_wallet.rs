//! Wallet over local HD derivation. Keys are derived per call and dropped
//! once the signature is produced.

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use log::debug;

use super::Wallet;
use crate::{
    config::MnemonicWalletFileConfig,
    models::{Digest, EcdsaSignature, PublicKey, SignerError, SigningAccount},
    services::hd_wallet::{LocalDerivationBackend, MnemonicKeyDeriver},
    utils::recovery_candidates,
};

pub struct HdWallet<D: LocalDerivationBackend = MnemonicKeyDeriver> {
    deriver: D,
}

impl HdWallet<MnemonicKeyDeriver> {
    pub fn from_phrase(phrase: &str, passphrase: &str) -> Result<Self, SignerError> {
        Ok(Self::new(MnemonicKeyDeriver::new(phrase, passphrase)?))
    }

    pub fn from_config(config: &MnemonicWalletFileConfig) -> Result<Self, SignerError> {
        let phrase = config.phrase.get_value()?;
        let passphrase = match &config.passphrase {
            Some(value) => value.get_value()?,
            None => String::new(),
        };
        Self::from_phrase(&phrase, &passphrase)
    }
}

impl<D: LocalDerivationBackend> HdWallet<D> {
    pub fn new(deriver: D) -> Self {
        Self { deriver }
    }

    fn signing_key(&self, key_id: &str) -> Result<SigningKey, SignerError> {
        let private_key = self.deriver.derive_private_key(key_id)?;
        SigningKey::from_slice(private_key.as_slice())
            .map_err(|e| SignerError::InvalidPath(format!("{key_id}: {e}")))
    }
}

#[async_trait]
impl<D: LocalDerivationBackend> Wallet for HdWallet<D> {
    async fn get_public_key(&self, key_id: &str) -> Result<PublicKey, SignerError> {
        Ok(PublicKey::from_signing_key(&self.signing_key(key_id)?))
    }

    async fn sign(
        &self,
        account: &SigningAccount,
        digest: &Digest,
        chain_id: Option<u64>,
    ) -> Result<EcdsaSignature, SignerError> {
        debug!(
            "Signing digest {} with derived key {}",
            digest.to_hex(),
            account.key_id
        );
        let signing_key = self.signing_key(&account.key_id)?;
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|e| SignerError::InvalidInput(format!("Failed to sign digest: {e}")))?;

        let v = recovery_candidates(chain_id)?
            .get(usize::from(recovery_id.to_byte()))
            .copied()
            .ok_or_else(|| {
                SignerError::RecoveryFailed(format!(
                    "unsupported recovery id {}",
                    recovery_id.to_byte()
                ))
            })?;

        let (r, s) = signature.split_bytes();
        EcdsaSignature::from_parts(&r, &s, v)
    }
}
