//! Wallet over a remote signing backend.
//!
//! The backend signs a digest and returns DER `(r, s)` with no recovery id.
//! The signature is canonicalized to low-S, then `v` is recovered by trying
//! both candidates against the account address.

use alloy::primitives::Address;
use async_trait::async_trait;
use log::debug;

use super::Wallet;
use crate::{
    models::{Digest, EcdsaSignature, PublicKey, SignerError, SigningAccount},
    services::kms::KmsK256Backend,
    utils::{decode_der_signature, resolve_recovery_id},
};

#[derive(Debug, Clone)]
pub struct KmsWallet<B: KmsK256Backend> {
    backend: B,
}

impl<B: KmsK256Backend> KmsWallet<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Address to recover against. Fetching it costs a public key round trip
    /// unless the account carries it.
    async fn target_address(&self, account: &SigningAccount) -> Result<Address, SignerError> {
        match account.address {
            Some(address) => Ok(address),
            None => self.get_address(&account.key_id).await,
        }
    }
}

#[async_trait]
impl<B: KmsK256Backend> Wallet for KmsWallet<B> {
    async fn get_public_key(&self, key_id: &str) -> Result<PublicKey, SignerError> {
        let der = self.backend.get_der_public_key(key_id).await?;
        PublicKey::from_der(&der)
    }

    async fn sign(
        &self,
        account: &SigningAccount,
        digest: &Digest,
        chain_id: Option<u64>,
    ) -> Result<EcdsaSignature, SignerError> {
        debug!(
            "Signing digest {} with remote key {}",
            digest.to_hex(),
            account.key_id
        );
        let der_signature = self
            .backend
            .sign_digest(&account.key_id, *digest.as_bytes())
            .await?;
        let canonical = decode_der_signature(&der_signature)?;

        let address = self.target_address(account).await?;
        let v = resolve_recovery_id(
            &address,
            digest.as_bytes(),
            &canonical.r,
            &canonical.s,
            chain_id,
        )?;

        EcdsaSignature::from_parts(&canonical.r, &canonical.s, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constants::{SECP256K1_HALF_N, SECP256K1_N},
        services::kms::{
            tests::{setup_mock_kms_backend, TEST_KEY_ID},
            KmsError, MockKmsK256Backend,
        },
    };
    use alloy::primitives::{eip191_hash_message, U256};
    use k256::{
        ecdsa::{Signature, SigningKey},
        elliptic_curve::rand_core::OsRng,
        FieldBytes,
    };
    use mockall::predicate::eq;
    use proptest::prelude::*;

    fn address_of(signing_key: &SigningKey) -> Address {
        PublicKey::from_signing_key(signing_key).to_address()
    }

    #[tokio::test]
    async fn test_get_public_key() {
        let signing_key = SigningKey::random(&mut OsRng);
        let wallet = KmsWallet::new(setup_mock_kms_backend(signing_key.clone()));

        let public_key = wallet.get_public_key(TEST_KEY_ID).await.unwrap();
        assert_eq!(public_key, PublicKey::from_signing_key(&signing_key));
        assert_eq!(
            wallet.get_address(TEST_KEY_ID).await.unwrap(),
            address_of(&signing_key)
        );
    }

    #[tokio::test]
    async fn test_get_public_key_unknown_key() {
        let wallet = KmsWallet::new(setup_mock_kms_backend(SigningKey::random(&mut OsRng)));
        let result = wallet.get_public_key("missing-key").await;
        assert!(matches!(result, Err(SignerError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_sign_resolves_legacy_v() {
        let signing_key = SigningKey::random(&mut OsRng);
        let wallet = KmsWallet::new(setup_mock_kms_backend(signing_key.clone()));
        let digest = Digest(eip191_hash_message(b"Hello World!").0);

        let signature = wallet
            .sign(&SigningAccount::new(TEST_KEY_ID), &digest, None)
            .await
            .unwrap();

        assert!(signature.v == 27 || signature.v == 28);
        let recovered = PublicKey::from_recovery(
            digest.as_bytes(),
            signature.v,
            &signature.r,
            &signature.s,
            None,
        )
        .unwrap();
        assert_eq!(recovered.to_address(), address_of(&signing_key));
    }

    #[tokio::test]
    async fn test_sign_resolves_eip155_v() {
        let signing_key = SigningKey::random(&mut OsRng);
        let wallet = KmsWallet::new(setup_mock_kms_backend(signing_key.clone()));
        let digest = Digest([0x24u8; 32]);
        let account = SigningAccount::new(TEST_KEY_ID).with_address(address_of(&signing_key));

        let signature = wallet.sign(&account, &digest, Some(3)).await.unwrap();
        assert!(signature.v == 41 || signature.v == 42);
    }

    #[tokio::test]
    async fn test_sign_with_explicit_address_skips_public_key_fetch() {
        let signing_key = SigningKey::random(&mut OsRng);
        let key = signing_key.clone();
        let mut backend = MockKmsK256Backend::new();
        backend.expect_get_der_public_key().never();
        backend
            .expect_sign_digest()
            .with(eq(TEST_KEY_ID), mockall::predicate::always())
            .times(1)
            .returning(move |_, digest| {
                let (signature, _) = key.sign_prehash_recoverable(&digest).unwrap();
                Ok(signature.to_der().as_bytes().to_vec())
            });

        let wallet = KmsWallet::new(backend);
        let account = SigningAccount::new(TEST_KEY_ID).with_address(address_of(&signing_key));
        assert!(wallet.sign(&account, &Digest([1u8; 32]), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_sign_wrong_address_fails_recovery() {
        let signing_key = SigningKey::random(&mut OsRng);
        let other = SigningKey::random(&mut OsRng);
        let wallet = KmsWallet::new(setup_mock_kms_backend(signing_key));
        let account = SigningAccount::new(TEST_KEY_ID).with_address(address_of(&other));

        let result = wallet.sign(&account, &Digest([7u8; 32]), Some(1)).await;
        assert!(matches!(result, Err(SignerError::RecoveryFailed(_))));
    }

    #[tokio::test]
    async fn test_sign_backend_failure_is_retryable() {
        let mut backend = MockKmsK256Backend::new();
        backend
            .expect_sign_digest()
            .returning(|_, _| Err(KmsError::HttpError("connection reset".to_string())));

        let wallet = KmsWallet::new(backend);
        let error = wallet
            .sign(&SigningAccount::new(TEST_KEY_ID), &Digest([1u8; 32]), None)
            .await
            .unwrap_err();
        assert!(matches!(error, SignerError::BackendError(_)));
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn test_sign_malformed_der() {
        let mut backend = MockKmsK256Backend::new();
        backend
            .expect_sign_digest()
            .returning(|_, _| Ok(vec![0x30, 0x03, 0x02, 0x01, 0x01]));

        let wallet = KmsWallet::new(backend);
        let result = wallet
            .sign(&SigningAccount::new(TEST_KEY_ID), &Digest([1u8; 32]), None)
            .await;
        assert!(matches!(result, Err(SignerError::MalformedInput(_))));
    }

    #[tokio::test]
    async fn test_sign_canonicalizes_high_s_from_backend() {
        let signing_key = SigningKey::random(&mut OsRng);
        let key = signing_key.clone();
        let mut backend = MockKmsK256Backend::new();
        backend.expect_sign_digest().returning(move |_, digest| {
            let (signature, _) = key.sign_prehash_recoverable(&digest).unwrap();
            let (r, s) = signature.split_bytes();
            let high_s = SECP256K1_N - U256::from_be_slice(&s);
            let high = Signature::from_scalars(
                r,
                FieldBytes::from(high_s.to_be_bytes::<32>()),
            )
            .unwrap();
            Ok(high.to_der().as_bytes().to_vec())
        });

        let wallet = KmsWallet::new(backend);
        let account = SigningAccount::new(TEST_KEY_ID).with_address(address_of(&signing_key));
        let signature = wallet
            .sign(&account, &Digest([9u8; 32]), None)
            .await
            .unwrap();

        assert!(U256::from_be_bytes(signature.s) <= SECP256K1_HALF_N);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_sign_round_trips_to_signer_address(
            secret in any::<[u8; 32]>(),
            digest in any::<[u8; 32]>(),
            chain_id in proptest::option::of(1u64..1_000_000),
        ) {
            let Ok(signing_key) = SigningKey::from_slice(&secret) else {
                return Ok(());
            };
            let expected = address_of(&signing_key);
            let wallet = KmsWallet::new(setup_mock_kms_backend(signing_key));

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let signature = runtime
                .block_on(wallet.sign(&SigningAccount::new(TEST_KEY_ID), &Digest(digest), chain_id))
                .unwrap();

            let recovered = PublicKey::from_recovery(
                &digest,
                signature.v,
                &signature.r,
                &signature.s,
                chain_id,
            )
            .unwrap();
            prop_assert_eq!(recovered.to_address(), expected);
        }
    }
}
