//! Transaction Ledger
//!
//! Bounded, most-recent-first list of transaction records.

use crate::types::TransactionRecord;
use crate::log_warn;

/// Maximum number of records kept
pub const LEDGER_CAPACITY: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionLedger {
    records: Vec<TransactionRecord>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front, dropping the oldest entries beyond capacity
    pub fn append(&mut self, record: TransactionRecord) {
        self.records.insert(0, record);
        self.records.truncate(LEDGER_CAPACITY);
    }

    /// Records, most recent first
    pub fn list(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Parse persisted JSON. Malformed input yields an empty ledger.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Vec<TransactionRecord>>(text) {
            Ok(mut records) => {
                records.truncate(LEDGER_CAPACITY);
                Self { records }
            }
            Err(e) => {
                log_warn!("ledger", "Discarding unreadable transaction history", error = e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}
