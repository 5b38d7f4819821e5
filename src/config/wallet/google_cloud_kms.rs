use serde::{Deserialize, Serialize};

use super::{PlainOrEnvConfigValue, WalletConfigValidate};
use crate::{config::ConfigFileError, constants::GOOGLE_CLOUD_DEFAULT_UNIVERSE_DOMAIN};

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_auth_provider_x509_cert_url() -> String {
    "https://www.googleapis.com/oauth2/v1/certs".to_string()
}

fn default_universe_domain() -> String {
    GOOGLE_CLOUD_DEFAULT_UNIVERSE_DOMAIN.to_string()
}

fn default_location() -> String {
    "global".to_string()
}

fn default_key_version() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GoogleCloudServiceAccountFileConfig {
    pub project_id: String,
    pub private_key_id: PlainOrEnvConfigValue,
    pub private_key: PlainOrEnvConfigValue,
    pub client_email: PlainOrEnvConfigValue,
    pub client_id: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_auth_provider_x509_cert_url")]
    pub auth_provider_x509_cert_url: String,
    #[serde(default)]
    pub client_x509_cert_url: String,
    #[serde(default = "default_universe_domain")]
    pub universe_domain: String,
}

/// Key ring coordinates. The crypto key itself is named per signing account.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GoogleCloudKmsKeyFileConfig {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub key_ring_id: String,
    /// Version used when the account key id does not name one.
    #[serde(default = "default_key_version")]
    pub key_version: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GoogleCloudKmsWalletFileConfig {
    pub service_account: GoogleCloudServiceAccountFileConfig,
    pub key: GoogleCloudKmsKeyFileConfig,
}

impl GoogleCloudKmsWalletFileConfig {
    fn validate_service_account(&self) -> Result<(), ConfigFileError> {
        let account = &self.service_account;
        if account.project_id.is_empty() {
            return Err(ConfigFileError::MissingField(
                "Google Cloud project_id cannot be empty".into(),
            ));
        }
        account.private_key_id.validate("Google Cloud private_key_id")?;
        account.private_key.validate("Google Cloud private_key")?;
        account.client_email.validate("Google Cloud client_email")?;
        if account.universe_domain.is_empty() {
            return Err(ConfigFileError::InvalidFormat(
                "Google Cloud universe_domain cannot be empty".into(),
            ));
        }
        Ok(())
    }

    fn validate_key(&self) -> Result<(), ConfigFileError> {
        if self.key.key_ring_id.is_empty() {
            return Err(ConfigFileError::MissingField(
                "Google Cloud KMS key_ring_id cannot be empty".into(),
            ));
        }
        if self.key.location.is_empty() {
            return Err(ConfigFileError::MissingField(
                "Google Cloud KMS location cannot be empty".into(),
            ));
        }
        if self.key.key_version == 0 {
            return Err(ConfigFileError::InvalidFormat(
                "Google Cloud KMS key_version starts at 1".into(),
            ));
        }
        Ok(())
    }
}

impl WalletConfigValidate for GoogleCloudKmsWalletFileConfig {
    fn validate(&self) -> Result<(), ConfigFileError> {
        self.validate_service_account()?;
        self.validate_key()?;
        Ok(())
    }
}
