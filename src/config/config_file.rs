//! Loading of the JSON wallet configuration file.
use std::{fs, path::Path};

use log::debug;
use thiserror::Error;

use super::{WalletConfigValidate, WalletFileConfig};
use crate::models::SignerError;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ConfigFileError> for SignerError {
    fn from(error: ConfigFileError) -> Self {
        match error {
            ConfigFileError::MissingField(_)
            | ConfigFileError::MissingEnvVar(_)
            | ConfigFileError::FileNotFound(_) => {
                SignerError::MissingConfiguration(error.to_string())
            }
            _ => SignerError::InvalidInput(error.to_string()),
        }
    }
}

/// Reads, parses and validates a wallet configuration file.
pub fn load_wallet_config(path: impl AsRef<Path>) -> Result<WalletFileConfig, ConfigFileError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigFileError::FileNotFound(path.display().to_string()));
    }
    debug!("Loading wallet configuration from {}", path.display());

    let config_str = fs::read_to_string(path)?;
    let config: WalletFileConfig = serde_json::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}
