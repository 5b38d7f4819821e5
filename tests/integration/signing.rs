//! End-to-end signing from a wallet configuration file.
use std::{env, fs};

use alloy::{
    consensus::TxEnvelope,
    eips::eip2718::Decodable2718,
    primitives::{address, U256},
};
use kms_eth_signer::{
    config::{load_wallet_config, WalletFileConfig},
    models::{derivation_key_id, EvmTransactionFields, SignerError, SigningAccount},
    services::{EvmSigner, EvmWallet, EvmWalletFactory, Wallet},
    utils::decode_hex,
};
use serial_test::serial;
use tempfile::TempDir;

const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("signer.json");
    fs::write(&path, contents).unwrap();
    path
}

async fn mnemonic_wallet_from_env() -> EvmWallet {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "type": "mnemonic",
            "config": {
                "phrase": { "type": "env", "name": "INTEGRATION_SIGNER_MNEMONIC" }
            }
        }"#,
    );

    let config = load_wallet_config(&path).unwrap();
    assert!(matches!(config, WalletFileConfig::Mnemonic(_)));
    EvmWalletFactory::create(&config).await.unwrap()
}

#[tokio::test]
#[serial]
async fn test_mnemonic_wallet_signs_message_from_config_file() {
    env::set_var("INTEGRATION_SIGNER_MNEMONIC", TEST_MNEMONIC);
    let wallet = mnemonic_wallet_from_env().await;

    let key_id = derivation_key_id("1").unwrap();
    assert_eq!(
        wallet.get_address_hex(&key_id).await.unwrap(),
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
    );

    let signer = EvmSigner::new(wallet, Some(1));
    let signature = signer
        .sign_message(&SigningAccount::new(key_id), "hello world !")
        .await
        .unwrap();
    assert_eq!(
        signature,
        "0x567ad2000e79cca03c26a5e2be0cf62169ce20ad81398b226cf0361e65813f2a51ddc02bf5d7683a4045ca4c19c9ca64913ee6ba4c1f377d6feb6c0b925d52b71b"
    );

    env::remove_var("INTEGRATION_SIGNER_MNEMONIC");
}

#[tokio::test]
#[serial]
async fn test_mnemonic_wallet_signs_recoverable_transaction() {
    env::set_var("INTEGRATION_SIGNER_MNEMONIC", TEST_MNEMONIC);
    let wallet = mnemonic_wallet_from_env().await;
    let signer = EvmSigner::new(wallet, Some(31337));

    let fields = EvmTransactionFields {
        nonce: 0,
        gas_limit: 21_000,
        to: Some(address!("3535353535353535353535353535353535353535")),
        value: U256::from(1u64),
        max_fee_per_gas: Some(2_000_000_000),
        max_priority_fee_per_gas: Some(1_000_000_000),
        ..Default::default()
    };
    let raw = signer
        .sign_transaction(&SigningAccount::new("0'/0/0"), &fields)
        .await
        .unwrap();

    let bytes = decode_hex(&raw, "raw transaction").unwrap();
    let envelope = TxEnvelope::decode_2718(&mut bytes.as_slice()).unwrap();
    assert_eq!(
        envelope.recover_signer().unwrap(),
        address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266")
    );

    env::remove_var("INTEGRATION_SIGNER_MNEMONIC");
}

#[tokio::test]
#[serial]
async fn test_missing_mnemonic_env_is_a_configuration_error() {
    env::remove_var("INTEGRATION_SIGNER_MNEMONIC");
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "type": "mnemonic",
            "config": {
                "phrase": { "type": "env", "name": "INTEGRATION_SIGNER_MNEMONIC" }
            }
        }"#,
    );

    let config = load_wallet_config(&path).unwrap();
    let result = EvmWalletFactory::create(&config).await;
    assert!(matches!(result, Err(SignerError::MissingConfiguration(_))));
}

#[tokio::test]
async fn test_unknown_wallet_type_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, r#"{ "type": "ledger", "config": {} }"#);

    let error: SignerError = load_wallet_config(&path).unwrap_err().into();
    assert!(matches!(error, SignerError::InvalidInput(_)));
}
