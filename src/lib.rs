//! # EVM Signer
//!
//! Signs Ethereum transactions, personal messages, raw digests and EIP-712
//! typed data with secp256k1 keys held in AWS KMS, Google Cloud KMS, or
//! derived locally from a BIP39 mnemonic.
//!
//! ## Module Structure
//!
//! - `config`: Wallet configuration files and environment settings
//! - `constants`: Curve and encoding constants
//! - `logging`: Logger setup
//! - `models`: Signatures, keys, accounts, digests and transaction fields
//! - `services`: KMS clients, wallets and the EVM signer
//! - `utils`: DER, hex, address and recovery helpers

pub mod config;
pub mod constants;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
