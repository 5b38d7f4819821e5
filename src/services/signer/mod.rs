//! # EVM Signing
//!
//! [`EvmSigner`] turns transaction fields and messages into digests, has a
//! [`Wallet`] sign them, and reassembles the signed artifact.
//!
//! - **Transactions**: legacy (EIP-155 when a chain id is configured) and
//!   EIP-1559, returned as `0x` hex of the network encoding
//! - **Messages**: EIP-191 personal messages, never chain-bound
//! - **Digests**: raw 32-byte digests, `r ‖ s ‖ v`
//! - **Typed data**: EIP-712 from a domain separator and struct hash

mod eip712;
pub use eip712::*;

use alloy::{
    consensus::{SignableTransaction, TxEnvelope},
    eips::eip2718::Encodable2718,
    primitives::{eip191_hash_message, Address},
};
use log::debug;

use crate::{
    models::{Digest, EcdsaSignature, EvmTransactionFields, SignerError, SigningAccount},
    services::{EvmWallet, Wallet},
    utils::encode_hex_prefixed,
};

pub struct EvmSigner<W: Wallet = EvmWallet> {
    wallet: W,
    chain_id: Option<u64>,
}

impl<W: Wallet> EvmSigner<W> {
    /// `chain_id` applies to every transaction signed through this signer.
    pub fn new(wallet: W, chain_id: Option<u64>) -> Self {
        Self { wallet, chain_id }
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Account address, derived from the wallet unless the account names it.
    pub async fn address(&self, account: &SigningAccount) -> Result<Address, SignerError> {
        match account.address {
            Some(address) => Ok(address),
            None => self.wallet.get_address(&account.key_id).await,
        }
    }

    /// Signs an unsigned transaction for the configured chain and returns its
    /// encoded form as `0x` hex.
    pub async fn sign_transaction(
        &self,
        account: &SigningAccount,
        fields: &EvmTransactionFields,
    ) -> Result<String, SignerError> {
        self.sign_transaction_for_chain(account, fields, self.chain_id)
            .await
    }

    /// Like [`Self::sign_transaction`] with an explicit chain id. `None` signs
    /// a pre-EIP-155 legacy transaction.
    pub async fn sign_transaction_for_chain(
        &self,
        account: &SigningAccount,
        fields: &EvmTransactionFields,
        chain_id: Option<u64>,
    ) -> Result<String, SignerError> {
        let envelope = if fields.is_eip1559() {
            let chain_id = chain_id.ok_or_else(|| {
                SignerError::MissingConfiguration(
                    "EIP-1559 transactions require a chain id".to_string(),
                )
            })?;
            let unsigned_tx = fields.to_eip1559(chain_id)?;
            let digest = Digest::from(unsigned_tx.signature_hash());

            let signature = self.wallet.sign(account, &digest, Some(chain_id)).await?;
            TxEnvelope::from(unsigned_tx.into_signed(signature.to_primitive(Some(chain_id))?))
        } else {
            let unsigned_tx = fields.to_legacy(chain_id)?;
            let digest = Digest::from(unsigned_tx.signature_hash());

            let signature = self.wallet.sign(account, &digest, chain_id).await?;
            TxEnvelope::from(unsigned_tx.into_signed(signature.to_primitive(chain_id)?))
        };

        debug!(
            "Signed transaction {} for key {}",
            envelope.tx_hash(),
            account.key_id
        );
        Ok(encode_hex_prefixed(envelope.encoded_2718()))
    }

    /// Signs `keccak256("\x19Ethereum Signed Message:\n" ‖ len ‖ message)`.
    pub async fn sign_message(
        &self,
        account: &SigningAccount,
        message: impl AsRef<[u8]>,
    ) -> Result<String, SignerError> {
        let digest = Digest::from(eip191_hash_message(message));
        self.sign_digest(account, &digest).await
    }

    /// Signs a digest as-is and returns `r ‖ s ‖ v` as `0x` hex.
    pub async fn sign_digest(
        &self,
        account: &SigningAccount,
        digest: &Digest,
    ) -> Result<String, SignerError> {
        Ok(self.sign_digest_raw(account, digest).await?.to_hex())
    }

    /// Same as [`Self::sign_digest`], keeping the signature structured.
    pub async fn sign_digest_raw(
        &self,
        account: &SigningAccount,
        digest: &Digest,
    ) -> Result<EcdsaSignature, SignerError> {
        self.wallet.sign(account, digest, None).await
    }

    /// Signs EIP-712 typed data given its hex-encoded domain separator and
    /// struct hash.
    pub async fn sign_typed_data(
        &self,
        account: &SigningAccount,
        domain_separator: &str,
        hash_struct_message: &str,
    ) -> Result<String, SignerError> {
        let digest = construct_eip712_message_hash(domain_separator, hash_struct_message)?;
        self.sign_digest(account, &digest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::PublicKey,
        services::{
            kms::tests::{setup_mock_kms_backend, TEST_KEY_ID},
            HdWallet, KmsWallet,
        },
        utils::decode_hex,
    };
    use alloy::{
        eips::eip2718::Decodable2718,
        primitives::{address, Bytes, U256},
    };
    use k256::ecdsa::SigningKey;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    // EIP-155 reference transaction, signed with private key 0x4646..46
    const EIP155_RAW_TX: &str = "0xf86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    fn hd_signer(chain_id: Option<u64>) -> EvmSigner<HdWallet> {
        EvmSigner::new(HdWallet::from_phrase(TEST_MNEMONIC, "").unwrap(), chain_id)
    }

    fn eip155_fields() -> EvmTransactionFields {
        EvmTransactionFields {
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: Some(address!("3535353535353535353535353535353535353535")),
            value: U256::from(1_000_000_000_000_000_000u128),
            ..Default::default()
        }
    }

    fn decode_envelope(raw: &str) -> TxEnvelope {
        let bytes = decode_hex(raw, "raw transaction").unwrap();
        TxEnvelope::decode_2718(&mut bytes.as_slice()).unwrap()
    }

    #[tokio::test]
    async fn test_sign_message_known_vector() {
        let signer = hd_signer(Some(1));
        let signature = signer
            .sign_message(&SigningAccount::new("0'/0/1"), "hello world !")
            .await
            .unwrap();

        assert_eq!(
            signature,
            "0x567ad2000e79cca03c26a5e2be0cf62169ce20ad81398b226cf0361e65813f2a51ddc02bf5d7683a4045ca4c19c9ca64913ee6ba4c1f377d6feb6c0b925d52b71b"
        );
    }

    #[tokio::test]
    async fn test_sign_digest_matches_sign_message() {
        let signer = hd_signer(None);
        let account = SigningAccount::new("0'/0/1");
        let digest: Digest = "0xe864033de15fb6ffafb8316bf5f80788fd7773e93cc6b8ea440664dddd8778e8"
            .parse()
            .unwrap();

        assert_eq!(
            signer.sign_digest(&account, &digest).await.unwrap(),
            signer.sign_message(&account, "hello world !").await.unwrap()
        );
    }

    #[test]
    fn test_digest_rejects_wrong_length() {
        let result = "0x1234".parse::<Digest>();
        assert!(matches!(result, Err(SignerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_sign_transaction_eip155_vector_through_kms() {
        let signing_key = SigningKey::from_slice(&[0x46u8; 32]).unwrap();
        let wallet = KmsWallet::new(setup_mock_kms_backend(signing_key));
        let signer = EvmSigner::new(wallet, Some(1));

        let raw = signer
            .sign_transaction(&SigningAccount::new(TEST_KEY_ID), &eip155_fields())
            .await
            .unwrap();
        assert_eq!(raw, EIP155_RAW_TX);
    }

    #[tokio::test]
    async fn test_sign_transaction_is_chain_bound() {
        let account = SigningAccount::new("0'/0/0");
        let expected = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

        for chain_id in [1u64, 3] {
            let raw = hd_signer(Some(chain_id))
                .sign_transaction(&account, &eip155_fields())
                .await
                .unwrap();

            let TxEnvelope::Legacy(signed) = decode_envelope(&raw) else {
                panic!("expected a legacy transaction");
            };
            assert_eq!(signed.tx().chain_id, Some(chain_id));
            assert_eq!(signed.recover_signer().unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_sign_transaction_without_chain_id() {
        let raw = hd_signer(None)
            .sign_transaction(&SigningAccount::new("0'/0/0"), &eip155_fields())
            .await
            .unwrap();

        let TxEnvelope::Legacy(signed) = decode_envelope(&raw) else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(signed.tx().chain_id, None);
        assert_eq!(
            signed.recover_signer().unwrap(),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
    }

    #[tokio::test]
    async fn test_sign_transaction_for_chain_overrides_configured_chain() {
        let signer = hd_signer(Some(1));
        let account = SigningAccount::new("0'/0/0");

        let raw = signer
            .sign_transaction_for_chain(&account, &eip155_fields(), Some(3))
            .await
            .unwrap();
        let TxEnvelope::Legacy(signed) = decode_envelope(&raw) else {
            panic!("expected a legacy transaction");
        };
        assert_eq!(signed.tx().chain_id, Some(3));
        assert_ne!(
            raw,
            signer.sign_transaction(&account, &eip155_fields()).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_sign_eip1559_transaction() {
        let fields = EvmTransactionFields {
            max_fee_per_gas: Some(30_000_000_000),
            max_priority_fee_per_gas: Some(1_000_000_000),
            data: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            ..eip155_fields()
        };

        let raw = hd_signer(Some(11155111))
            .sign_transaction(&SigningAccount::new("0'/0/1"), &fields)
            .await
            .unwrap();
        assert!(raw.starts_with("0x02"));

        let TxEnvelope::Eip1559(signed) = decode_envelope(&raw) else {
            panic!("expected an EIP-1559 transaction");
        };
        assert_eq!(signed.tx().chain_id, 11155111);
        assert_eq!(signed.tx().input, fields.data);
        assert_eq!(
            signed.recover_signer().unwrap(),
            address!("70997970c51812dc3a010c7d01b50e0d17dc79c8")
        );
    }

    #[tokio::test]
    async fn test_sign_eip1559_requires_chain_id() {
        let fields = EvmTransactionFields {
            max_fee_per_gas: Some(2),
            max_priority_fee_per_gas: Some(1),
            ..eip155_fields()
        };

        let result = hd_signer(None)
            .sign_transaction(&SigningAccount::new("0'/0/0"), &fields)
            .await;
        assert!(matches!(result, Err(SignerError::MissingConfiguration(_))));
    }

    #[tokio::test]
    async fn test_sign_message_ignores_chain_id() {
        let account = SigningAccount::new("0'/0/0");
        let with_chain = hd_signer(Some(5)).sign_message(&account, "hi").await.unwrap();
        let without_chain = hd_signer(None).sign_message(&account, "hi").await.unwrap();

        assert_eq!(with_chain, without_chain);
        assert!(with_chain.ends_with("1b") || with_chain.ends_with("1c"));
        assert_eq!(with_chain.len(), 2 + 65 * 2);
    }

    #[tokio::test]
    async fn test_sign_typed_data() {
        let signer = hd_signer(Some(1));
        let account = SigningAccount::new("0'/0/0");
        let domain = format!("0x{}", "11".repeat(32));
        let hash_struct = "22".repeat(32);

        let signature = signer
            .sign_typed_data(&account, &domain, &hash_struct)
            .await
            .unwrap();

        let digest = construct_eip712_message_hash(&domain, &hash_struct).unwrap();
        let raw = signer.sign_digest_raw(&account, &digest).await.unwrap();
        assert_eq!(signature, raw.to_hex());

        let recovered =
            PublicKey::from_recovery(digest.as_bytes(), raw.v, &raw.r, &raw.s, None).unwrap();
        assert_eq!(
            recovered.to_address(),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
        );
    }

    #[tokio::test]
    async fn test_sign_typed_data_invalid_input() {
        let result = hd_signer(None)
            .sign_typed_data(&SigningAccount::new("0'/0/0"), "0x1234", &"22".repeat(32))
            .await;
        assert!(matches!(result, Err(SignerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_address() {
        let signer = hd_signer(None);
        let derived = signer.address(&SigningAccount::new("0'/0/1")).await.unwrap();
        assert_eq!(derived, address!("70997970c51812dc3a010c7d01b50e0d17dc79c8"));

        let explicit = address!("3535353535353535353535353535353535353535");
        let account = SigningAccount::new("0'/0/1").with_address(explicit);
        assert_eq!(signer.address(&account).await.unwrap(), explicit);
    }
}
