use serde::{Deserialize, Serialize};

use super::WalletConfigValidate;
use crate::config::ConfigFileError;

/// AWS KMS wallet. Credentials come from the default AWS provider chain;
/// key ids are supplied per signing account.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct AwsKmsWalletFileConfig {
    #[serde(default)]
    pub region: Option<String>,
}

impl WalletConfigValidate for AwsKmsWalletFileConfig {
    fn validate(&self) -> Result<(), ConfigFileError> {
        if matches!(&self.region, Some(region) if region.trim().is_empty()) {
            return Err(ConfigFileError::InvalidFormat(
                "AWS region cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
