//! Strong Phrase Validation
//!
//! Runs every check on user-entered phrase text and reports all of them, so
//! the UI can render a complete diagnostic instead of the first failure.
//!
//! Checks, in order:
//! 1. `wordCount`: exactly 12 or 24 words
//! 2. `noDuplicates`: no repeated words (usually a transcription error)
//! 3. `validChars`: lowercase a-z only
//! 4. `validLength`: every word 3-8 characters, like the standard list
//! 5. `validCrypt`: BIP-39 list membership and checksum
//! 6. `validPhrase`: derives the stored account address (only when an
//!    account is present)

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, OnyxError, OnyxResult};
use crate::types::Address;

use super::mnemonic::{self, WordCount};

const MIN_WORD_LEN: usize = 3;
const MAX_WORD_LEN: usize = 8;

/// Result of a single sub-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub valid: bool,
    pub message: String,
}

impl ValidationCheck {
    fn new(valid: bool, pass: impl Into<String>, fail: impl Into<String>) -> Self {
        let message = if valid { pass.into() } else { fail.into() };
        Self { valid, message }
    }
}

/// All sub-checks of one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseChecks {
    pub word_count: ValidationCheck,
    pub no_duplicates: ValidationCheck,
    pub valid_chars: ValidationCheck,
    pub valid_length: ValidationCheck,
    pub valid_crypt: ValidationCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_phrase: Option<ValidationCheck>,
}

impl PhraseChecks {
    /// Checks paired with their wire names, in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ValidationCheck)> {
        [
            ("wordCount", Some(&self.word_count)),
            ("noDuplicates", Some(&self.no_duplicates)),
            ("validChars", Some(&self.valid_chars)),
            ("validLength", Some(&self.valid_length)),
            ("validCrypt", Some(&self.valid_crypt)),
            ("validPhrase", self.valid_phrase.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, check)| check.map(|c| (name, c)))
    }
}

/// Transient report returned by [`validate_phrase_strong`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseValidation {
    pub is_valid: bool,
    pub title: String,
    pub message: String,
    pub word_count: usize,
    pub checks: PhraseChecks,
}

impl PhraseValidation {
    /// Wire names of the failing checks
    pub fn failed_checks(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|(_, check)| !check.valid)
            .map(|(name, _)| name)
            .collect()
    }

    /// Collapse the report into a single error.
    ///
    /// The code reflects the most specific failure: a mismatch against the
    /// account only counts when the phrase itself is well-formed and standard.
    pub fn into_result(self) -> OnyxResult<()> {
        if self.is_valid {
            return Ok(());
        }

        let checks = &self.checks;
        let shape_ok = checks.word_count.valid
            && checks.no_duplicates.valid
            && checks.valid_chars.valid
            && checks.valid_length.valid;
        let code = if !shape_ok {
            ErrorCode::InvalidPhraseFormat
        } else if !checks.valid_crypt.valid {
            ErrorCode::InvalidPhraseStandard
        } else {
            ErrorCode::PhraseMismatch
        };

        let details = checks
            .iter()
            .filter(|(_, check)| !check.valid)
            .map(|(_, check)| check.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(OnyxError::new(code, self.message).with_details(details))
    }
}

/// Run every phrase check. `expected` is the stored account address, if any.
pub fn validate_phrase_strong(text: &str, expected: Option<&Address>) -> PhraseValidation {
    let normalized = mnemonic::normalize_phrase(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    let count = words.len();

    let word_count = ValidationCheck::new(
        WordCount::from_count(count).is_some(),
        format!("{} words", count),
        format!("{} words (need 12 or 24)", count),
    );

    let no_duplicates = ValidationCheck::new(
        count > 0 && !mnemonic::has_duplicate_words(&normalized),
        "No duplicate words",
        if count == 0 { "No words entered" } else { "Contains duplicate words" },
    );

    let valid_chars = ValidationCheck::new(
        count > 0 && words.iter().all(|w| w.chars().all(|c| c.is_ascii_lowercase())),
        "All lowercase letters",
        "Contains invalid characters",
    );

    let valid_length = ValidationCheck::new(
        count > 0 && words.iter().all(|w| (MIN_WORD_LEN..=MAX_WORD_LEN).contains(&w.len())),
        "Word lengths valid",
        "Some words too short/long",
    );

    let valid_crypt = ValidationCheck::new(
        mnemonic::validate_standard(&normalized),
        "The phrase is cryptographically valid",
        "The phrase is not cryptographically valid",
    );

    let valid_phrase = expected.map(|address| {
        let matches = mnemonic::derive_address(&normalized)
            .map(|derived| derived == *address)
            .unwrap_or(false);
        ValidationCheck::new(matches, "Valid pass phrase entered", "Invalid pass phrase entered")
    });

    let checks = PhraseChecks {
        word_count,
        no_duplicates,
        valid_chars,
        valid_length,
        valid_crypt,
        valid_phrase,
    };
    let is_valid = checks.iter().all(|(_, check)| check.valid);

    let (title, message) = if is_valid {
        ("Valid Format!", "Your seed phrase is valid.")
    } else if count == 0 {
        ("Empty Input", "Please enter a seed phrase to validate.")
    } else {
        (
            "Invalid Format",
            "Your seed phrase does not meet the required format. Please check the details below.",
        )
    };

    PhraseValidation {
        is_valid,
        title: title.to_string(),
        message: message.to_string(),
        word_count: count,
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPEATING: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";
    const UNIQUE: &str = "ozone drill grab fiber curtain grace pudding thank cruise elder eight picnic";

    fn hardhat_address() -> Address {
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap()
    }

    #[test]
    fn test_reports_every_check() {
        let result = validate_phrase_strong("Hello", None);
        assert!(!result.is_valid);
        assert_eq!(result.checks.iter().count(), 5);
        assert_eq!(result.failed_checks(), vec!["wordCount", "validCrypt"]);
    }

    #[test]
    fn test_unique_standard_phrase_passes() {
        let result = validate_phrase_strong(UNIQUE, None);
        assert!(result.is_valid, "{:?}", result.failed_checks());
        assert_eq!(result.title, "Valid Format!");
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_duplicates_flagged_even_when_standard() {
        // A legal BIP-39 vector that repeats words
        let result = validate_phrase_strong(REPEATING, None);
        assert!(result.checks.valid_crypt.valid);
        assert!(!result.checks.no_duplicates.valid);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_unknown_word_keeps_word_count() {
        let with_unknown = UNIQUE.replacen("grace", "qqqq", 1);
        let result = validate_phrase_strong(&with_unknown, None);
        assert!(result.checks.word_count.valid);
        assert!(!result.checks.valid_crypt.valid);
    }

    #[test]
    fn test_chars_and_lengths() {
        let digits = UNIQUE.replacen("grace", "gr4ce", 1);
        let result = validate_phrase_strong(&digits, None);
        assert!(!result.checks.valid_chars.valid);

        let long = UNIQUE.replacen("grace", "gracefully", 1);
        let result = validate_phrase_strong(&long, None);
        assert!(!result.checks.valid_length.valid);
        assert!(result.checks.valid_chars.valid);
    }

    #[test]
    fn test_account_match_check() {
        let hardhat = "test test test test test test test test test test test junk";
        let result = validate_phrase_strong(hardhat, Some(&hardhat_address()));
        assert!(result.checks.valid_phrase.as_ref().unwrap().valid);

        let result = validate_phrase_strong(UNIQUE, Some(&hardhat_address()));
        assert!(!result.checks.valid_phrase.as_ref().unwrap().valid);
        assert_eq!(result.failed_checks(), vec!["validPhrase"]);
    }

    #[test]
    fn test_empty_input() {
        let result = validate_phrase_strong("   ", None);
        assert_eq!(result.title, "Empty Input");
        assert_eq!(result.word_count, 0);
        assert!(result.checks.iter().all(|(_, c)| !c.valid));
    }

    #[test]
    fn test_into_result_codes() {
        let err = validate_phrase_strong("one two", None).into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhraseFormat);

        let unknown = UNIQUE.replacen("grace", "qqqq", 1);
        let err = validate_phrase_strong(&unknown, None).into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhraseStandard);

        let err = validate_phrase_strong(UNIQUE, Some(&hardhat_address()))
            .into_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PhraseMismatch);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(validate_phrase_strong(UNIQUE, None)).unwrap();
        assert!(json["checks"]["wordCount"]["valid"].as_bool().unwrap());
        assert!(json["checks"].get("validPhrase").is_none());
        assert_eq!(json["wordCount"], 12);
        assert_eq!(json["isValid"], true);
    }
}
