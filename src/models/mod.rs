mod error;
pub use error::*;

mod public_key;
pub use public_key::*;

mod signature;
pub use signature::*;

mod account;
pub use account::*;

mod digest;
pub use digest::*;

mod derivation;
pub use derivation::*;

mod transaction;
pub use transaction::*;
