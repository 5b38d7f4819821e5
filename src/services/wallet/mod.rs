//! # Wallets
//!
//! One signing contract over two structurally different backends.
//!
//! ```text
//! Wallet (trait)
//!   ├── KmsWallet<B>  - remote signer; DER out, `v` recovered by trial
//!   └── HdWallet<D>   - local BIP32 derivation; `v` known from signing
//! EvmWallet (enum dispatch over the configured backends)
//! ```

mod kms_wallet;
pub use kms_wallet::*;

mod local_wallet;
pub use local_wallet::*;

use alloy::primitives::Address;
use async_trait::async_trait;
use log::info;

use crate::{
    config::{WalletConfigValidate, WalletFileConfig},
    models::{Digest, EcdsaSignature, PublicKey, SignerError, SigningAccount},
    services::{AwsKmsClient, GoogleCloudKmsClient},
    utils::to_address_hex,
};

#[async_trait]
pub trait Wallet: Send + Sync {
    /// Public key held under `key_id`.
    async fn get_public_key(&self, key_id: &str) -> Result<PublicKey, SignerError>;

    /// Signs a 32-byte digest. `v` is EIP-155 encoded when `chain_id` is set.
    async fn sign(
        &self,
        account: &SigningAccount,
        digest: &Digest,
        chain_id: Option<u64>,
    ) -> Result<EcdsaSignature, SignerError>;

    async fn get_address(&self, key_id: &str) -> Result<Address, SignerError> {
        Ok(self.get_public_key(key_id).await?.to_address())
    }

    async fn get_address_hex(&self, key_id: &str) -> Result<String, SignerError> {
        Ok(to_address_hex(&self.get_address(key_id).await?))
    }
}

pub enum EvmWallet {
    AwsKms(KmsWallet<AwsKmsClient>),
    GoogleCloudKms(KmsWallet<GoogleCloudKmsClient>),
    Mnemonic(HdWallet),
}

#[async_trait]
impl Wallet for EvmWallet {
    async fn get_public_key(&self, key_id: &str) -> Result<PublicKey, SignerError> {
        match self {
            Self::AwsKms(wallet) => wallet.get_public_key(key_id).await,
            Self::GoogleCloudKms(wallet) => wallet.get_public_key(key_id).await,
            Self::Mnemonic(wallet) => wallet.get_public_key(key_id).await,
        }
    }

    async fn sign(
        &self,
        account: &SigningAccount,
        digest: &Digest,
        chain_id: Option<u64>,
    ) -> Result<EcdsaSignature, SignerError> {
        match self {
            Self::AwsKms(wallet) => wallet.sign(account, digest, chain_id).await,
            Self::GoogleCloudKms(wallet) => wallet.sign(account, digest, chain_id).await,
            Self::Mnemonic(wallet) => wallet.sign(account, digest, chain_id).await,
        }
    }
}

pub struct EvmWalletFactory;

impl EvmWalletFactory {
    /// Builds the wallet selected by `config`. Missing settings fail here,
    /// before any signing is attempted.
    pub async fn create(config: &WalletFileConfig) -> Result<EvmWallet, SignerError> {
        config.validate()?;

        let wallet = match config {
            WalletFileConfig::AwsKms(aws_config) => {
                let client = AwsKmsClient::new(aws_config).await?;
                EvmWallet::AwsKms(KmsWallet::new(client))
            }
            WalletFileConfig::GoogleCloudKms(gcp_config) => {
                let client = GoogleCloudKmsClient::new(gcp_config)?;
                EvmWallet::GoogleCloudKms(KmsWallet::new(client))
            }
            WalletFileConfig::Mnemonic(mnemonic_config) => {
                EvmWallet::Mnemonic(HdWallet::from_config(mnemonic_config)?)
            }
        };
        info!("Created {} wallet", config.kind());

        Ok(wallet)
    }
}
