//! Structured Logging with Secret Redaction
//!
//! Every log line goes to stderr as
//! `[timestamp] LEVEL [module] message | key=value ...`.
//!
//! Field values are redacted before they are formatted:
//! - recovery phrases and private keys are replaced entirely, both by key name
//!   and by shape (anything that looks like a 12/24-word phrase)
//! - addresses keep a short prefix and suffix
//! - transaction hashes keep a short prefix and suffix

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to enable/disable debug logging
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable debug logging
pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Disable debug logging
pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let redacted = redact_if_sensitive(key, &value.to_string());
        self.fields.push((key, redacted));
        self
    }

    /// Render the line without the timestamp prefix
    pub fn render(&self) -> String {
        let fields_str = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        if fields_str.is_empty() {
            format!("{} [{}] {}", self.level, self.module, self.message)
        } else {
            format!("{} [{}] {} | {}", self.level, self.module, self.message, fields_str)
        }
    }

    /// Log the entry
    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

/// Redact a value based on its key, falling back to its shape
fn redact_if_sensitive(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    let fully_redacted_keys = [
        "phrase", "mnemonic", "seed", "private", "secret", "signing_key", "password",
    ];
    if fully_redacted_keys.iter().any(|k| key_lower.contains(k)) || looks_like_phrase(value) {
        return redact_value(value);
    }

    let address_keys = ["address", "recipient", "sender", "from", "to"];
    if address_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_address(value);
    }

    let hash_keys = ["tx_hash", "hash", "txid"];
    if hash_keys.iter().any(|k| key_lower.contains(k)) {
        return redact_hash(value);
    }

    value.to_string()
}

/// Twelve or more lowercase alphabetic words
fn looks_like_phrase(value: &str) -> bool {
    let words: Vec<&str> = value.split_whitespace().collect();
    words.len() >= 12 && words.iter().all(|w| w.chars().all(|c| c.is_ascii_lowercase()))
}

/// Fully redact a sensitive value
fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.len();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (keep `0x` + 6 and the last 4)
fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 8 } else { 6 };
    let suffix_len = 4;

    if !trimmed.is_ascii() || trimmed.len() <= prefix_len + suffix_len + 3 {
        return redact_value(trimmed);
    }

    format!("{}...{}", &trimmed[..prefix_len], &trimmed[trimmed.len() - suffix_len..])
}

/// Partially redact a hash (keep `0x` + 10 and the last 6)
fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if !trimmed.is_ascii() || trimmed.len() <= 20 {
        return trimmed.to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    format!("{}...{}", &trimmed[..prefix_len], &trimmed[trimmed.len() - 6..])
}

/// Convenience macro for debug logging
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for info logging
#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for warning logging
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for error logging
#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_redact_address() {
        let redacted = redact_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        assert_eq!(redacted, "0xd8dA6B...6045");
    }

    #[test]
    fn test_redact_hash() {
        let hash = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
        assert_eq!(redact_hash(hash), "0x1234567890...abcdef");
    }

    #[test]
    fn test_phrase_redacted_by_key_and_shape() {
        assert!(redact_if_sensitive("phrase", "anything").contains("REDACTED"));
        // An innocuous key still hides a phrase-shaped value
        assert!(redact_if_sensitive("input", PHRASE).contains("REDACTED"));
        assert_eq!(redact_if_sensitive("amount", "0.0500"), "0.0500");
    }

    #[test]
    fn test_render_redacts_fields() {
        let entry = LogEntry::new(LogLevel::Info, "gateway", "Transaction confirmed")
            .field("value", "0.0500")
            .field("private_key", "deadbeefdeadbeef")
            .field("to", "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

        let line = entry.render();
        assert!(line.starts_with("INFO [gateway] Transaction confirmed | "));
        assert!(line.contains("value=0.0500"));
        assert!(!line.contains("deadbeef"));
        assert!(line.contains("to=0xd8dA6B...6045"));
    }
}
