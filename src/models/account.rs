use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Key handle plus an optional pre-known address.
///
/// `key_id` is opaque to the signing core: a KMS key identifier for remote
/// wallets, a derivation path for HD wallets. Supplying `address` saves a
/// public key fetch per signature on remote wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningAccount {
    pub key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl SigningAccount {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

impl From<&str> for SigningAccount {
    fn from(key_id: &str) -> Self {
        Self::new(key_id)
    }
}
