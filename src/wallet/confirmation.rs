//! Phrase Confirmation
//!
//! Onboarding protocol that makes the user prove they saved the recovery
//! phrase before the wallet is considered ready:
//!
//! ```text
//! NoAccount --issue_new / issue_imported--> PhraseIssued --confirm(match)--> Confirmed
//!                                               ^    |
//!                                               +----+ confirm(mismatch)
//! ```
//!
//! Only the derived address is compared, so re-entry is insensitive to letter
//! case and whitespace.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountStore, KeyValueStore};
use crate::error::{OnyxError, OnyxResult};
use crate::types::Address;
use crate::{log_info, log_warn};

use super::mnemonic::{self, WordCount};
use super::validation::{validate_phrase_strong, PhraseValidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingState {
    NoAccount,
    PhraseIssued,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    /// Re-entered phrase does not reproduce the stored account
    Rejected(PhraseValidation),
}

impl ConfirmationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationOutcome::Confirmed)
    }
}

#[derive(Debug, Clone)]
pub struct PhraseConfirmation {
    state: OnboardingState,
}

impl Default for PhraseConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseConfirmation {
    pub fn new() -> Self {
        Self {
            state: OnboardingState::NoAccount,
        }
    }

    /// Pick up after a restart: a stored account still awaits confirmation
    pub fn resume<S: KeyValueStore>(store: &AccountStore<S>) -> Self {
        let state = if store.account().is_some() {
            OnboardingState::PhraseIssued
        } else {
            OnboardingState::NoAccount
        };
        Self { state }
    }

    pub fn state(&self) -> OnboardingState {
        self.state
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == OnboardingState::Confirmed
    }

    /// Create a brand-new account and return its phrase for display
    pub fn issue_new<S: KeyValueStore>(
        &mut self,
        store: &mut AccountStore<S>,
        word_count: WordCount,
    ) -> OnyxResult<SecretString> {
        let phrase = mnemonic::generate_phrase(word_count)?;
        let account = Account::from_phrase(phrase.expose_secret())?;
        store.save(account)?;

        self.state = OnboardingState::PhraseIssued;
        log_info!("confirmation", "Recovery phrase issued", words = word_count.words());
        Ok(phrase)
    }

    /// Adopt a user-supplied phrase as the account
    pub fn issue_imported<S: KeyValueStore>(
        &mut self,
        store: &mut AccountStore<S>,
        text: &str,
    ) -> OnyxResult<Address> {
        let format = mnemonic::validate_format(text);
        if !format.valid {
            return Err(OnyxError::invalid_phrase_format(format!(
                "Recovery phrase must have 12 or 24 words, got {}",
                format.word_count
            )));
        }

        let account = Account::from_phrase(text)?;
        let address = account.address();
        store.save(account)?;

        self.state = OnboardingState::PhraseIssued;
        log_info!("confirmation", "Recovery phrase imported", address = address);
        Ok(address)
    }

    /// Check re-entered phrase text against the stored account.
    ///
    /// Rejection leaves both this protocol and the store untouched.
    pub fn confirm<S: KeyValueStore>(
        &mut self,
        store: &AccountStore<S>,
        text: &str,
    ) -> OnyxResult<ConfirmationOutcome> {
        let expected = store.require_account()?.address();

        let matches = mnemonic::derive_address(text)
            .map(|derived| derived == expected)
            .unwrap_or(false);

        if matches {
            self.state = OnboardingState::Confirmed;
            log_info!("confirmation", "Recovery phrase confirmed", address = expected);
            return Ok(ConfirmationOutcome::Confirmed);
        }

        let diagnostic = validate_phrase_strong(text, Some(&expected));
        log_warn!(
            "confirmation",
            "Recovery phrase rejected",
            failed = diagnostic.failed_checks().join(",")
        );
        Ok(ConfirmationOutcome::Rejected(diagnostic))
    }

    /// Back to the start, e.g. after the account store was cleared
    pub fn reset(&mut self) {
        self.state = OnboardingState::NoAccount;
    }
}
