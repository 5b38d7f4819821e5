//! Wallet configuration definitions.
//!
//! One of three backends:
//! - AWS KMS (`aws_kms`)
//! - Google Cloud KMS (`google_cloud_kms`)
//! - BIP39 mnemonic with local BIP32 derivation (`mnemonic`)
use serde::{Deserialize, Serialize};

use super::ConfigFileError;

mod aws_kms;
pub use aws_kms::*;

mod google_cloud_kms;
pub use google_cloud_kms::*;

mod mnemonic;
pub use mnemonic::*;

/// A secret given inline or by the name of an environment variable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlainOrEnvConfigValue {
    Env { name: String },
    Plain { value: String },
}

impl PlainOrEnvConfigValue {
    pub fn get_value(&self) -> Result<String, ConfigFileError> {
        match self {
            PlainOrEnvConfigValue::Env { name } => std::env::var(name).map_err(|_| {
                ConfigFileError::MissingEnvVar(format!("Environment variable {name} not found"))
            }),
            PlainOrEnvConfigValue::Plain { value } => Ok(value.clone()),
        }
    }

    /// Checks the value is present without resolving it.
    pub fn validate(&self, field: &str) -> Result<(), ConfigFileError> {
        match self {
            PlainOrEnvConfigValue::Env { name } if name.is_empty() => {
                Err(ConfigFileError::MissingField(format!(
                    "{field}: environment variable name cannot be empty"
                )))
            }
            PlainOrEnvConfigValue::Plain { value } if value.is_empty() => Err(
                ConfigFileError::InvalidFormat(format!("{field} value cannot be empty")),
            ),
            _ => Ok(()),
        }
    }
}

pub trait WalletConfigValidate {
    fn validate(&self) -> Result<(), ConfigFileError>;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", content = "config")]
pub enum WalletFileConfig {
    AwsKms(AwsKmsWalletFileConfig),
    GoogleCloudKms(GoogleCloudKmsWalletFileConfig),
    Mnemonic(MnemonicWalletFileConfig),
}

impl WalletFileConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            WalletFileConfig::AwsKms(_) => "aws_kms",
            WalletFileConfig::GoogleCloudKms(_) => "google_cloud_kms",
            WalletFileConfig::Mnemonic(_) => "mnemonic",
        }
    }
}

impl WalletConfigValidate for WalletFileConfig {
    fn validate(&self) -> Result<(), ConfigFileError> {
        match self {
            WalletFileConfig::AwsKms(config) => config.validate(),
            WalletFileConfig::GoogleCloudKms(config) => config.validate(),
            WalletFileConfig::Mnemonic(config) => config.validate(),
        }
    }
}
