//! # AWS KMS Backend
//!
//! Secp256k1 public key retrieval and digest signing through AWS KMS, for keys
//! created with the `ECC_SECG_P256K1` key spec.
//!
//! ```text
//! AwsKmsClient (implements KmsK256Backend)
//!   ├── Authentication (default AWS credential provider chain)
//!   ├── Public Key Retrieval in DER encoding (cached per key id)
//!   └── Digest Signing (ECDSA_SHA_256 over a DIGEST message type)
//! ```

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, Region};
use aws_sdk_kms::{
    primitives::Blob,
    types::{MessageType, SigningAlgorithmSpec},
    Client,
};
use log::{debug, info};
use tokio::sync::RwLock;

use crate::{
    config::AwsKmsWalletFileConfig,
    services::kms::{KmsError, KmsK256Backend, KmsResult},
};

type PublicKeyCache = Arc<RwLock<HashMap<String, Vec<u8>>>>;

#[derive(Debug, Clone)]
pub struct AwsKmsClient {
    inner: Client,
    public_keys: PublicKeyCache,
}

impl AwsKmsClient {
    pub async fn new(config: &AwsKmsWalletFileConfig) -> KmsResult<Self> {
        let region_provider = RegionProviderChain::first_try(config.region.clone().map(Region::new))
            .or_default_provider();

        let auth_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        if auth_config.region().is_none() {
            return Err(KmsError::MissingConfiguration(
                "AWS region is not configured".to_string(),
            ));
        }
        info!(
            "AWS KMS client initialised for region {:?}",
            auth_config.region()
        );

        Ok(Self {
            inner: Client::new(&auth_config),
            public_keys: PublicKeyCache::default(),
        })
    }

    async fn cached_public_key(&self, key_id: &str) -> Option<Vec<u8>> {
        let cache_read = self.public_keys.read().await;
        cache_read.get(key_id).cloned()
    }

    async fn cache_public_key(&self, key_id: &str, der: Vec<u8>) {
        let mut cache_write = self.public_keys.write().await;
        cache_write.insert(key_id.to_string(), der);
    }
}

#[async_trait]
impl KmsK256Backend for AwsKmsClient {
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> KmsResult<Vec<u8>> {
        if let Some(cached) = self.cached_public_key(key_id).await {
            return Ok(cached);
        }

        debug!("Fetching secp256k1 public key from AWS KMS, key_id: {}", key_id);
        let get_output = self
            .inner
            .get_public_key()
            .key_id(key_id)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_not_found_exception())
                {
                    KmsError::KeyNotFound(key_id.to_string())
                } else {
                    KmsError::GetError(format!(
                        "Failed to get secp256k1 public key for key '{key_id}': {e:?}"
                    ))
                }
            })?;

        let der_pk_blob = get_output
            .public_key
            .ok_or(KmsError::MissingField("PublicKey".to_string()))?
            .into_inner();

        self.cache_public_key(key_id, der_pk_blob.clone()).await;

        Ok(der_pk_blob)
    }

    async fn sign_digest<'a, 'b>(
        &'a self,
        key_id: &'b str,
        digest: [u8; 32],
    ) -> KmsResult<Vec<u8>> {
        debug!("Signing digest with AWS KMS, key_id: {}", key_id);
        let sign_result = self
            .inner
            .sign()
            .key_id(key_id)
            .signing_algorithm(SigningAlgorithmSpec::EcdsaSha256)
            .message_type(MessageType::Digest)
            .message(Blob::new(digest))
            .send()
            .await;

        let der_signature = sign_result
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_not_found_exception())
                {
                    KmsError::KeyNotFound(key_id.to_string())
                } else {
                    KmsError::PermissionError(format!("{e:?}"))
                }
            })?
            .signature
            .ok_or(KmsError::SignError(
                "Signature not found in response".to_string(),
            ))?
            .into_inner();

        Ok(der_signature)
    }
}
