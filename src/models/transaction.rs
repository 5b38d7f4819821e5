//! Unsigned EVM transaction fields.
use alloy::{
    consensus::{TxEip1559, TxLegacy},
    eips::eip2930::AccessList,
    primitives::{Address, Bytes, TxKind, U256},
};
use serde::{Deserialize, Serialize};

use crate::models::SignerError;

/// Fields of an unsigned transaction.
///
/// Both `max_fee_per_gas` and `max_priority_fee_per_gas` set selects an
/// EIP-1559 transaction; otherwise a legacy one is built from `gas_price`.
/// A missing `to` is a contract creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmTransactionFields {
    pub nonce: u64,
    #[serde(default)]
    pub gas_price: u128,
    pub gas_limit: u64,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub max_fee_per_gas: Option<u128>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<u128>,
}

impl EvmTransactionFields {
    pub fn is_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some() && self.max_priority_fee_per_gas.is_some()
    }

    fn kind(&self) -> TxKind {
        match self.to {
            Some(address) => TxKind::Call(address),
            None => TxKind::Create,
        }
    }

    /// Builds a legacy transaction, EIP-155 scoped when `chain_id` is set.
    pub fn to_legacy(&self, chain_id: Option<u64>) -> Result<TxLegacy, SignerError> {
        if self.max_fee_per_gas.is_some() != self.max_priority_fee_per_gas.is_some() {
            return Err(SignerError::TransactionError(
                "max_fee_per_gas and max_priority_fee_per_gas must be set together".to_string(),
            ));
        }

        Ok(TxLegacy {
            chain_id,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.kind(),
            value: self.value,
            input: self.data.clone(),
        })
    }

    /// Builds an EIP-1559 transaction. Requires both fee fields.
    pub fn to_eip1559(&self, chain_id: u64) -> Result<TxEip1559, SignerError> {
        let (Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) =
            (self.max_fee_per_gas, self.max_priority_fee_per_gas)
        else {
            return Err(SignerError::TransactionError(
                "EIP-1559 transaction requires max_fee_per_gas and max_priority_fee_per_gas"
                    .to_string(),
            ));
        };

        if max_priority_fee_per_gas > max_fee_per_gas {
            return Err(SignerError::TransactionError(format!(
                "max_priority_fee_per_gas ({max_priority_fee_per_gas}) exceeds max_fee_per_gas ({max_fee_per_gas})"
            )));
        }

        Ok(TxEip1559 {
            chain_id,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            to: self.kind(),
            value: self.value,
            access_list: AccessList::default(),
            input: self.data.clone(),
        })
    }
}
