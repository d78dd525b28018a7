//! Recovery Phrase Generation and Derivation
//!
//! Phrases are BIP-39 English mnemonics of 12 or 24 words. Every entry point
//! normalizes the text first (NFKD, lowercase, single spaces), so letter case
//! and stray whitespace never change the derived account.
//!
//! SECURITY: entropy, normalized phrases and seeds are zeroized on drop.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::{OnyxError, OnyxResult};
use crate::types::Address;

use super::derivation::{self, DerivedKey};

/// Supported phrase lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordCount {
    Twelve,
    TwentyFour,
}

impl WordCount {
    pub fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::TwentyFour => 24,
        }
    }

    /// Entropy size in bytes (128 or 256 bits)
    fn entropy_len(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            12 => Some(WordCount::Twelve),
            24 => Some(WordCount::TwentyFour),
            _ => None,
        }
    }
}

/// Outcome of the purely syntactic shape check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCheck {
    pub valid: bool,
    pub word_count: usize,
}

/// Canonical form of user-entered phrase text
pub fn normalize_phrase(text: &str) -> Zeroizing<String> {
    let decomposed: Zeroizing<String> = Zeroizing::new(text.nfkd().collect());
    let lowered = Zeroizing::new(decomposed.to_lowercase());
    Zeroizing::new(lowered.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Generate a fresh, checksum-valid recovery phrase.
///
/// Phrases with a repeated word are re-drawn so a freshly issued phrase
/// always passes the duplicate-word check of the strong validator.
pub fn generate_phrase(word_count: WordCount) -> OnyxResult<SecretString> {
    loop {
        let mut entropy = Zeroizing::new(vec![0u8; word_count.entropy_len()]);
        OsRng.fill_bytes(entropy.as_mut_slice());

        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy.as_slice())
            .map_err(|e| OnyxError::crypto_error(format!("Failed to create mnemonic: {}", e)))?;
        let phrase = Zeroizing::new(mnemonic.to_string());

        if !has_duplicate_words(&phrase) {
            return Ok(SecretString::from(phrase.to_string()));
        }
    }
}

/// Shape check: whitespace-split word count must be exactly 12 or 24
pub fn validate_format(text: &str) -> FormatCheck {
    let word_count = text.split_whitespace().count();
    FormatCheck {
        valid: WordCount::from_count(word_count).is_some(),
        word_count,
    }
}

/// Full standard compliance: known words, supported length and a consistent
/// checksum word
pub fn validate_standard(text: &str) -> bool {
    parse_standard(text).is_ok()
}

/// Derive the account address for a phrase
pub fn derive_address(text: &str) -> OnyxResult<Address> {
    Ok(derive_key(text)?.address)
}

/// Derive the account signing key and address for a phrase
pub fn derive_key(text: &str) -> OnyxResult<DerivedKey> {
    let mnemonic = parse_standard(text)?;
    let seed = Zeroizing::new(mnemonic.to_seed(""));
    derivation::derive_account_key(seed.as_ref())
}

fn parse_standard(text: &str) -> OnyxResult<Mnemonic> {
    let normalized = normalize_phrase(text);
    let count = normalized.split(' ').filter(|w| !w.is_empty()).count();
    if WordCount::from_count(count).is_none() {
        return Err(OnyxError::invalid_phrase_standard(format!(
            "Recovery phrase must have 12 or 24 words, got {}",
            count
        )));
    }

    Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| OnyxError::invalid_phrase_standard(format!("Invalid recovery phrase: {}", e)))
}

pub(crate) fn has_duplicate_words(normalized: &str) -> bool {
    let mut seen = HashSet::new();
    normalized.split_whitespace().any(|w| !seen.insert(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use secrecy::ExposeSecret;

    const HARDHAT: &str = "test test test test test test test test test test test junk";

    #[test]
    fn test_generate_phrase_lengths() {
        for count in [WordCount::Twelve, WordCount::TwentyFour] {
            let phrase = generate_phrase(count).unwrap();
            let text = phrase.expose_secret();
            assert_eq!(text.split(' ').count(), count.words());
            assert!(validate_standard(text));
            assert!(!has_duplicate_words(text));
        }
    }

    #[test]
    fn test_known_vector_address() {
        let address = derive_address(HARDHAT).unwrap();
        assert_eq!(address.to_string(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

        let abandon = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert_eq!(
            derive_address(abandon).unwrap().to_string(),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
    }

    #[test]
    fn test_derivation_ignores_case_and_whitespace() {
        let messy = format!("  {}\n", HARDHAT.to_uppercase().replace(' ', "   "));
        assert_eq!(derive_address(&messy).unwrap(), derive_address(HARDHAT).unwrap());
    }

    #[test]
    fn test_validate_format_counts() {
        let eleven = vec!["abandon"; 11].join(" ");
        let thirteen = vec!["abandon"; 13].join(" ");
        assert!(!validate_format(&eleven).valid);
        assert!(!validate_format(&thirteen).valid);
        assert_eq!(validate_format(HARDHAT), FormatCheck { valid: true, word_count: 12 });
        assert_eq!(validate_format("").word_count, 0);
    }

    #[test]
    fn test_validate_standard_rejects_bad_checksum() {
        // Well-shaped, real words, wrong checksum word
        let bad = vec!["abandon"; 12].join(" ");
        assert!(validate_format(&bad).valid);
        assert!(!validate_standard(&bad));

        let err = derive_address(&bad).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPhraseStandard);
    }

    #[test]
    fn test_validate_standard_rejects_other_lengths() {
        // 15 words is legal BIP-39 but not a supported wallet phrase
        let fifteen = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon address";
        assert!(!validate_standard(fifteen));
    }
}
