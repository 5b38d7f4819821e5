//! # Services Module
//!
//! Key custody backends, the wallets built on them, and the EVM signer.

pub mod kms;
pub use kms::*;

mod aws_kms;
pub use aws_kms::*;

mod google_cloud_kms;
pub use google_cloud_kms::*;

mod hd_wallet;
pub use hd_wallet::*;

mod wallet;
pub use wallet::*;

mod signer;
pub use signer::*;
