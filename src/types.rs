//! Shared types for Onyx Core
//!
//! Data structures that cross module boundaries are defined here so the
//! persisted and UI-facing JSON shapes stay in one place.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{OnyxError, OnyxResult};
use crate::utils::crypto::to_checksum_address;

// =============================================================================
// Address
// =============================================================================

/// A 20-byte account address.
///
/// Equality is byte-exact. `Display` renders the EIP-55 checksummed form,
/// which is also what gets persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> OnyxResult<Self> {
        let array: [u8; 20] = bytes
            .try_into()
            .map_err(|_| OnyxError::crypto_error(format!("Address must be 20 bytes, got {}", bytes.len())))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 checksummed `0x` string
    pub fn to_checksum(&self) -> String {
        to_checksum_address(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = OnyxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::wallet::parse_address(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Address> for ethers_core::types::Address {
    fn from(address: Address) -> Self {
        ethers_core::types::Address::from(address.0)
    }
}

// =============================================================================
// Transaction hash
// =============================================================================

/// A 32-byte transaction hash, rendered as lowercase `0x` hex
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl FromStr for TxHash {
    type Err = OnyxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| OnyxError::parse_error(format!("Transaction hash missing 0x prefix: {}", trimmed)))?;
        let bytes = hex::decode(hex_part)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| OnyxError::parse_error("Transaction hash must be 32 bytes"))?;
        Ok(Self(array))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Transaction records
// =============================================================================

/// Direction of a ledger entry relative to the wallet account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxDirection {
    Send,
    Receive,
}

/// One entry in the local transaction ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    /// Whole-unit decimal string, e.g. "0.0500"
    pub value: String,
    /// Milliseconds since epoch, local clock at record creation
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub direction: TxDirection,
}

impl TransactionRecord {
    /// A `send` record stamped with the current local time
    pub fn sent(hash: TxHash, from: Address, to: Address, value: impl Into<String>) -> Self {
        Self {
            hash,
            from,
            to,
            value: value.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            direction: TxDirection::Send,
        }
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Uniform JSON envelope handed to UI collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<OnyxError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: OnyxError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T> From<OnyxResult<T>> for ApiResponse<T> {
    fn from(result: OnyxResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn test_address_roundtrip_is_checksummed() {
        let lower: Address = ADDR.to_lowercase().parse().unwrap();
        assert_eq!(lower.to_string(), ADDR);
        let checksummed: Address = ADDR.parse().unwrap();
        assert_eq!(lower, checksummed);
    }

    #[test]
    fn test_record_json_uses_type_field() {
        let record = TransactionRecord {
            hash: TxHash::from_bytes([0xab; 32]),
            from: ADDR.parse().unwrap(),
            to: ADDR.parse().unwrap(),
            value: "0.0500".to_string(),
            timestamp: 1_700_000_000_000,
            direction: TxDirection::Send,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "send");
        assert_eq!(json["value"], "0.0500");
        assert_eq!(json["hash"], format!("0x{}", "ab".repeat(32)));

        let back: TransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_tx_hash_rejects_short_input() {
        assert!("0x1234".parse::<TxHash>().is_err());
        assert!("ab".repeat(32).parse::<TxHash>().is_err());
    }

    #[test]
    fn test_api_response_from_result() {
        let ok: ApiResponse<String> = Ok("0xhash".to_string()).into();
        assert!(ok.to_json().contains("\"success\":true"));

        let err: ApiResponse<String> = Err(OnyxError::no_account()).into();
        let json = err.to_json();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("no_account"));
    }
}
