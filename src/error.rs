//! Unified error types for Onyx Core
//!
//! Every fallible operation in the crate returns [`OnyxResult`]. Errors carry a
//! machine-readable [`ErrorCode`] so UI collaborators can branch on the kind
//! without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all Onyx operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnyxError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl OnyxError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_phrase_format(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPhraseFormat, msg)
    }

    pub fn invalid_phrase_standard(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPhraseStandard, msg)
    }

    pub fn invalid_recipient(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRecipientAddress, msg)
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAmount, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn no_account() -> Self {
        Self::new(ErrorCode::NoAccount, "No wallet account is present")
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::JsonError, msg)
    }


    /// Errors the user can fix by editing their input and trying again.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidPhraseFormat
                | ErrorCode::InvalidPhraseStandard
                | ErrorCode::PhraseMismatch
                | ErrorCode::InvalidRecipientAddress
                | ErrorCode::InvalidAmount
                | ErrorCode::InvalidPrivateKey
        )
    }
}

impl fmt::Display for OnyxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for OnyxError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Phrase errors
    InvalidPhraseFormat,
    InvalidPhraseStandard,
    PhraseMismatch,
    InvalidPrivateKey,

    // Send input errors
    InvalidRecipientAddress,
    InvalidAmount,

    // Account errors
    NoAccount,
    StorageError,

    // Network errors
    NetworkError,
    ConfirmationTimeout,
    TransactionFailed,

    // Crypto errors
    CryptoError,
    SigningFailed,

    // Parse errors
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for Onyx operations
pub type OnyxResult<T> = Result<T, OnyxError>;

// Conversions from common error types

impl From<serde_json::Error> for OnyxError {
    fn from(e: serde_json::Error) -> Self {
        OnyxError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for OnyxError {
    fn from(e: hex::FromHexError) -> Self {
        OnyxError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for OnyxError {
    fn from(e: std::io::Error) -> Self {
        OnyxError::new(ErrorCode::StorageError, e.to_string())
    }
}

impl From<reqwest::Error> for OnyxError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OnyxError::new(ErrorCode::NetworkError, "Request timed out")
        } else if e.is_connect() {
            OnyxError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            OnyxError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<url::ParseError> for OnyxError {
    fn from(e: url::ParseError) -> Self {
        OnyxError::new(ErrorCode::NetworkError, format!("Invalid endpoint URL: {}", e))
    }
}

impl From<bitcoin::bip32::Error> for OnyxError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        OnyxError::new(ErrorCode::CryptoError, format!("BIP32 error: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for OnyxError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        OnyxError::new(ErrorCode::CryptoError, format!("Secp256k1 error: {}", e))
    }
}

impl From<bip39::Error> for OnyxError {
    fn from(e: bip39::Error) -> Self {
        OnyxError::new(ErrorCode::InvalidPhraseStandard, format!("BIP39 error: {}", e))
    }
}

impl From<ethers_signers::WalletError> for OnyxError {
    fn from(e: ethers_signers::WalletError) -> Self {
        OnyxError::new(ErrorCode::SigningFailed, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = OnyxError::invalid_amount("Insufficient funds")
            .with_details("Required: 0.0011 ETH, Available: 0.0010 ETH");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("invalid_amount"));
        assert!(json.contains("Insufficient funds"));
    }

    #[test]
    fn test_display_includes_details() {
        let err = OnyxError::network_error("node unreachable").with_details("0xabc");
        assert_eq!(err.to_string(), "[NetworkError] node unreachable (0xabc)");
    }

    #[test]
    fn test_input_error_classification() {
        assert!(OnyxError::invalid_recipient("bad").is_input_error());
        assert!(!OnyxError::network_error("down").is_input_error());
        assert!(!OnyxError::no_account().is_input_error());
    }
}
