//! # Remote Signing Backend Contract
//!
//! Remote key services are reduced to two capabilities over a named key:
//! fetching its DER `SubjectPublicKeyInfo` and signing a 32-byte digest into a
//! DER `ECDSA-Sig-Value`. Neither returns a recovery id; that is resolved by
//! the wallet layer.
//!
//! ```text
//! KmsK256Backend
//!   ├── AwsKmsClient          (aws-sdk-kms)
//!   └── GoogleCloudKmsClient  (REST via reqwest)
//! ```
//! The trait is mocked with `mockall` for unit testing.

use async_trait::async_trait;
use serde::Serialize;

#[cfg(test)]
use mockall::automock;

use crate::models::SignerError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum KmsError {
    #[error("KMS key not found: {0}")]
    KeyNotFound(String),
    #[error("KMS get error: {0}")]
    GetError(String),
    #[error("KMS signing error: {0}")]
    SignError(String),
    #[error("KMS permissions error: {0}")]
    PermissionError(String),
    #[error("KMS HTTP error: {0}")]
    HttpError(String),
    #[error("KMS API error: {0}")]
    ApiError(String),
    #[error("KMS response parse error: {0}")]
    ParseError(String),
    #[error("KMS missing field: {0}")]
    MissingField(String),
    #[error("KMS config error: {0}")]
    ConfigError(String),
    #[error("KMS missing configuration: {0}")]
    MissingConfiguration(String),
}

pub type KmsResult<T> = Result<T, KmsError>;

impl From<KmsError> for SignerError {
    fn from(error: KmsError) -> Self {
        match error {
            KmsError::KeyNotFound(msg) => SignerError::KeyNotFound(msg),
            KmsError::GetError(_)
            | KmsError::SignError(_)
            | KmsError::PermissionError(_)
            | KmsError::HttpError(_)
            | KmsError::ApiError(_) => SignerError::BackendError(error.to_string()),
            KmsError::ParseError(_) | KmsError::MissingField(_) => {
                SignerError::MalformedInput(error.to_string())
            }
            KmsError::ConfigError(msg) | KmsError::MissingConfiguration(msg) => {
                SignerError::MissingConfiguration(msg)
            }
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait KmsK256Backend: Send + Sync {
    /// Fetches the DER-encoded secp256k1 public key of `key_id`.
    async fn get_der_public_key<'a, 'b>(&'a self, key_id: &'b str) -> KmsResult<Vec<u8>>;
    /// Signs a prehashed digest with ECDSA/secp256k1. Returns a DER-encoded signature.
    async fn sign_digest<'a, 'b>(&'a self, key_id: &'b str, digest: [u8; 32])
        -> KmsResult<Vec<u8>>;
}
