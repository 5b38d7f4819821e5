use serde::Serialize;
use thiserror::Error;

use crate::utils::{AddressDerivationError, DerError, HexCodecError, Secp256k1Error};

/// Failure taxonomy for every wallet and signing operation.
///
/// A sign call never partially succeeds: it yields a complete `(r, s, v)`
/// triple or one of these errors.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SignerError {
    /// ASN.1/DER parsing failure on a signature or public key.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Remote backend call failed (network, auth, throttling).
    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Required setup is absent; raised as soon as it is detected.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// Neither recovery candidate reproduces the expected address.
    #[error("Recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("Invalid derivation format: {0}")]
    InvalidDerivationFormat(String),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),
}

impl SignerError {
    /// Determines if the failure may succeed on a later attempt.
    ///
    /// Only backend failures are transient. Callers own the retry policy; the
    /// crate never retries internally.
    pub fn is_retryable(&self) -> bool {
        match self {
            SignerError::BackendError(_) => true,

            SignerError::MalformedInput(_)
            | SignerError::KeyNotFound(_)
            | SignerError::MissingConfiguration(_)
            | SignerError::RecoveryFailed(_)
            | SignerError::InvalidDerivationFormat(_)
            | SignerError::InvalidPath(_)
            | SignerError::InvalidInput(_)
            | SignerError::TransactionError(_) => false,
        }
    }
}

impl From<DerError> for SignerError {
    fn from(error: DerError) -> Self {
        SignerError::MalformedInput(error.to_string())
    }
}

impl From<AddressDerivationError> for SignerError {
    fn from(error: AddressDerivationError) -> Self {
        SignerError::MalformedInput(error.to_string())
    }
}

impl From<HexCodecError> for SignerError {
    fn from(error: HexCodecError) -> Self {
        SignerError::InvalidInput(error.to_string())
    }
}

impl From<Secp256k1Error> for SignerError {
    fn from(error: Secp256k1Error) -> Self {
        match error {
            Secp256k1Error::RecoveryFailed(_) | Secp256k1Error::RecoveryError(_) => {
                SignerError::RecoveryFailed(error.to_string())
            }
            Secp256k1Error::InvalidRecoveryId(_) | Secp256k1Error::InvalidSignature(_) => {
                SignerError::InvalidInput(error.to_string())
            }
        }
    }
}
