//! Short-form derivation identifiers for HD wallets.
//!
//! HD key ids are paths relative to `m/44'/60'/`, i.e. `{account}'/0/{index}`.
//! Callers may name them more compactly:
//!
//! | Input                          | Key id      |
//! |--------------------------------|-------------|
//! | `"4-67"`                       | `4'/0/67`   |
//! | `"67"`                         | `0'/0/67`   |
//! | `{ "account": 4, "index": 67 }`| `4'/0/67`   |
//! | `{ "index": 67 }`              | `0'/0/67`   |

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{BIP32_HARDENED_OFFSET, DEFAULT_DERIVATION_ACCOUNT},
    models::SignerError,
};

static COMPACT_FORMAT: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^(?:(\d+)-)?(\d+)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationKey {
    #[serde(default)]
    pub account: Option<u32>,
    pub index: u32,
}

impl DerivationKey {
    pub fn new(account: Option<u32>, index: u32) -> Self {
        Self { account, index }
    }

    /// Both components must be below the hardened offset `2^31`.
    pub fn validate(&self) -> Result<(), SignerError> {
        for (name, value) in [("account", self.account), ("index", Some(self.index))] {
            if let Some(value) = value.filter(|v| *v >= BIP32_HARDENED_OFFSET) {
                return Err(SignerError::InvalidDerivationFormat(format!(
                    "{name} {value} must be below {BIP32_HARDENED_OFFSET}"
                )));
            }
        }
        Ok(())
    }

    /// Canonical key id, `{account}'/0/{index}`.
    pub fn key_id(&self) -> String {
        format!(
            "{}'/0/{}",
            self.account.unwrap_or(DEFAULT_DERIVATION_ACCOUNT),
            self.index
        )
    }
}

impl fmt::Display for DerivationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_id())
    }
}

fn parse_component(value: &str, input: &str) -> Result<u32, SignerError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|v| *v < BIP32_HARDENED_OFFSET)
        .ok_or_else(|| {
            SignerError::InvalidDerivationFormat(format!(
                "'{input}': component '{value}' is out of range"
            ))
        })
}

impl FromStr for DerivationKey {
    type Err = SignerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let captures = COMPACT_FORMAT.captures(input.trim()).ok_or_else(|| {
            SignerError::InvalidDerivationFormat(format!(
                "'{input}': expected '{{account}}-{{index}}' or '{{index}}'"
            ))
        })?;

        let account = captures
            .get(1)
            .map(|m| parse_component(m.as_str(), input))
            .transpose()?;
        let index = captures
            .get(2)
            .map(|m| parse_component(m.as_str(), input))
            .transpose()?
            .ok_or_else(|| SignerError::InvalidDerivationFormat(format!("'{input}'")))?;

        Ok(Self { account, index })
    }
}

/// Either form accepted by [`derivation_key_id`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DerivationId {
    Compact(String),
    Structured(DerivationKey),
}

impl From<&str> for DerivationId {
    fn from(value: &str) -> Self {
        DerivationId::Compact(value.to_string())
    }
}

impl From<DerivationKey> for DerivationId {
    fn from(value: DerivationKey) -> Self {
        DerivationId::Structured(value)
    }
}

/// Resolves a short-form identifier into a canonical HD key id.
pub fn derivation_key_id(input: impl Into<DerivationId>) -> Result<String, SignerError> {
    match input.into() {
        DerivationId::Compact(value) => Ok(value.parse::<DerivationKey>()?.key_id()),
        DerivationId::Structured(key) => {
            key.validate()?;
            Ok(key.key_id())
        }
    }
}
