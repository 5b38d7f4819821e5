//! # Signing Example
//!
//! Loads a wallet configuration file and signs a personal message, a raw
//! digest, or EIP-712 typed data with one of its keys.
//!
//! ## Usage
//!
//! ```bash
//! # Personal message, wallet from SIGNER_CONFIG_PATH (default config/signer.json)
//! cargo run --example sign_message -- --key-id "0'/0/0" --message "hello world !"
//!
//! # Raw digest
//! cargo run --example sign_message -- --key-id "0'/0/0" \
//!   --digest "e864033de15fb6ffafb8316bf5f80788fd7773e93cc6b8ea440664dddd8778e8"
//!
//! # EIP-712 typed data
//! cargo run --example sign_message -- --key-id "0'/0/0" \
//!   --domain-separator "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f" \
//!   --hash-struct "c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
//! ```
//!
//! HD wallet key ids also accept the short `{account}-{index}` form.

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use kms_eth_signer::{
    config::{load_wallet_config, SignerConfig, WalletFileConfig},
    logging::setup_logging,
    models::{derivation_key_id, Digest, SigningAccount},
    services::{EvmSigner, EvmWalletFactory, Wallet},
    utils::to_checksum_address,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key id: KMS key identifier, or derivation path for mnemonic wallets.
    #[arg(long)]
    key_id: String,

    /// Personal message to sign (EIP-191).
    #[arg(long)]
    message: Option<String>,

    /// 32-byte digest to sign as-is (hex, with or without 0x prefix).
    #[arg(long)]
    digest: Option<String>,

    /// EIP-712 domain separator (hex, with or without 0x prefix).
    #[arg(long, requires = "hash_struct")]
    domain_separator: Option<String>,

    /// EIP-712 struct hash (hex, with or without 0x prefix).
    #[arg(long, requires = "domain_separator")]
    hash_struct: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    setup_logging()?;

    let args = Args::parse();
    let config = SignerConfig::from_env()?;
    let wallet_config = load_wallet_config(&config.config_path)
        .wrap_err_with(|| format!("Failed to load {}", config.config_path))?;

    let key_id = match &wallet_config {
        WalletFileConfig::Mnemonic(_) if !args.key_id.contains('/') => {
            derivation_key_id(args.key_id.as_str())?
        }
        _ => args.key_id.clone(),
    };

    let wallet = EvmWalletFactory::create(&wallet_config).await?;
    let address = wallet.get_address(&key_id).await?;
    let signer = EvmSigner::new(wallet, config.chain_id);
    let account = SigningAccount::new(key_id).with_address(address);

    let signature = match (args.message, args.digest, args.domain_separator, args.hash_struct) {
        (Some(message), None, None, None) => signer.sign_message(&account, message).await?,
        (None, Some(digest), None, None) => {
            let digest: Digest = digest.parse()?;
            signer.sign_digest(&account, &digest).await?
        }
        (None, None, Some(domain_separator), Some(hash_struct)) => {
            signer
                .sign_typed_data(&account, &domain_separator, &hash_struct)
                .await?
        }
        _ => {
            return Err(eyre!(
                "Provide exactly one of --message, --digest, or --domain-separator/--hash-struct"
            ))
        }
    };

    println!("Signer:    {}", to_checksum_address(&address));
    println!("Signature: {}", signature);
    Ok(())
}
