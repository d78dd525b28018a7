//! Utilities Module
//!
//! Hashing helpers and redacting structured logging.

pub mod crypto;
pub mod logging;

pub use crypto::*;
