use std::env;

use super::ConfigFileError;

const DEFAULT_SIGNER_CONFIG_PATH: &str = "config/signer.json";

/// Process-level settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    pub config_path: String,
    pub chain_id: Option<u64>,
}

impl SignerConfig {
    /// Reads `SIGNER_CONFIG_PATH` and `CHAIN_ID`.
    pub fn from_env() -> Result<Self, ConfigFileError> {
        let config_path = env::var("SIGNER_CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_SIGNER_CONFIG_PATH.to_string());

        let chain_id = match env::var("CHAIN_ID") {
            Ok(value) if !value.trim().is_empty() => {
                Some(value.trim().parse::<u64>().map_err(|e| {
                    ConfigFileError::InvalidFormat(format!("CHAIN_ID '{value}': {e}"))
                })?)
            }
            _ => None,
        };

        Ok(Self {
            config_path,
            chain_id,
        })
    }
}
