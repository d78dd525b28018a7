//! Wallet Module
//!
//! Recovery phrase handling, key derivation, input validation and the
//! phrase confirmation protocol.

pub mod mnemonic;
mod derivation;
mod validation;
mod address_validation;
mod amount_validation;
mod confirmation;

pub use mnemonic::{
    derive_address, derive_key, generate_phrase, normalize_phrase, validate_format,
    validate_standard, FormatCheck, WordCount,
};
pub use derivation::*;
pub use validation::*;
pub use address_validation::*;
pub use amount_validation::*;
pub use confirmation::*;
