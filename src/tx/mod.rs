//! Transaction Module
//!
//! Construction and signing of outgoing transfers.

mod signer;

pub use signer::*;
