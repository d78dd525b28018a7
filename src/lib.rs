//! Onyx Core Library
//!
//! Key-management and transaction core of a single-account wallet for an
//! EVM-style chain.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: Recovery phrases, key derivation, input validation and the
//!   phrase confirmation protocol
//! - **account**: The persisted account and its transaction ledger
//! - **network**: Node configuration, JSON-RPC access and the send pipeline
//! - **tx**: Transfer construction and signing
//!
//! # Security
//!
//! This crate uses `zeroize` and `secrecy` to clear sensitive data from
//! memory. Phrases, seeds and private keys are zeroed when dropped, and log
//! output redacts anything that looks like a recovery phrase.
//!
//! # Example
//!
//! ```rust,ignore
//! use onyx_core::{AccountStore, FileStore, NetworkConfig, NetworkGateway, PhraseConfirmation, WordCount};
//!
//! let mut store = AccountStore::open(FileStore::open("wallet.json")?)?;
//! let mut onboarding = PhraseConfirmation::resume(&store);
//! let phrase = onboarding.issue_new(&mut store, WordCount::Twelve)?;
//! // ... user writes the phrase down and types it back ...
//! onboarding.confirm(&store, &typed)?;
//!
//! let gateway = NetworkGateway::connect(NetworkConfig::from_env()?)?;
//! let sent = gateway.send_transaction(&mut store, "0x...", "0.05").await?;
//! ```

pub mod error;
pub mod types;
pub mod utils;
pub mod wallet;
pub mod account;
pub mod network;
pub mod tx;

// Re-export key types for convenience
pub use error::{OnyxError, OnyxResult, ErrorCode};
pub use types::{Address, ApiResponse, TransactionRecord, TxDirection, TxHash};
pub use wallet::{
    validate_phrase_strong, ConfirmationOutcome, OnboardingState, PhraseConfirmation,
    PhraseValidation, WordCount,
};
pub use account::{Account, AccountStore, FileStore, KeyValueStore, MemoryStore, TransactionLedger};
pub use network::{BalanceReading, JsonRpcClient, NetworkConfig, NetworkGateway, NodeRpc, SentTransaction};
