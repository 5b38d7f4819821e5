//! Wallet configuration: a JSON file selecting the backend, plus process
//! settings from the environment.
mod config_file;
pub use config_file::*;

mod wallet;
pub use wallet::*;

mod signer_config;
pub use signer_config::*;
