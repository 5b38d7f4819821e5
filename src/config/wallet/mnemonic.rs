use serde::{Deserialize, Serialize};

use super::{PlainOrEnvConfigValue, WalletConfigValidate};
use crate::config::ConfigFileError;

/// Local HD wallet seeded from a BIP39 phrase.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MnemonicWalletFileConfig {
    pub phrase: PlainOrEnvConfigValue,
    /// Optional BIP39 passphrase ("25th word").
    #[serde(default)]
    pub passphrase: Option<PlainOrEnvConfigValue>,
}

impl WalletConfigValidate for MnemonicWalletFileConfig {
    fn validate(&self) -> Result<(), ConfigFileError> {
        self.phrase.validate("Mnemonic phrase")?;
        if let Some(PlainOrEnvConfigValue::Env { name }) = &self.passphrase {
            if name.is_empty() {
                return Err(ConfigFileError::MissingField(
                    "Mnemonic passphrase environment variable name cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }
}
