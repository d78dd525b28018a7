//! Account Module
//!
//! Holds the single wallet account and its transaction ledger, and persists
//! both through a [`KeyValueStore`] backend.
//!
//! SECURITY: the recovery phrase or private key is held in zeroizing buffers
//! and only exposed through scoped accessors.

mod ledger;
mod store;

pub use ledger::*;
pub use store::*;

use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::{OnyxError, OnyxResult};
use crate::types::{Address, TransactionRecord};
use crate::wallet::{self, mnemonic};
use crate::{log_info, log_warn};

/// Root of the account's signing capability
pub enum AccountSecret {
    Phrase(SecretString),
    PrivateKey(Zeroizing<[u8; 32]>),
}

/// The wallet account. Only constructible by derivation, so the address
/// always belongs to the secret.
pub struct Account {
    address: Address,
    secret: AccountSecret,
}

impl Account {
    /// Build an account from recovery phrase text (normalized first)
    pub fn from_phrase(text: &str) -> OnyxResult<Self> {
        let normalized = mnemonic::normalize_phrase(text);
        let address = mnemonic::derive_address(&normalized)?;
        Ok(Self {
            address,
            secret: AccountSecret::Phrase(SecretString::from(normalized.to_string())),
        })
    }

    /// Build an account from a hex private key
    pub fn from_private_key(key_hex: &str) -> OnyxResult<Self> {
        let secret = wallet::parse_private_key(key_hex)?;
        let address = wallet::address_from_private_key(&secret)?;
        Ok(Self {
            address,
            secret: AccountSecret::PrivateKey(secret),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn has_phrase(&self) -> bool {
        matches!(self.secret, AccountSecret::Phrase(_))
    }

    /// Run `f` with the recovery phrase, if the account has one
    pub fn with_phrase<R>(&self, f: impl FnOnce(&str) -> R) -> Option<R> {
        match &self.secret {
            AccountSecret::Phrase(phrase) => Some(f(phrase.expose_secret())),
            AccountSecret::PrivateKey(_) => None,
        }
    }

    /// The 32-byte signing key
    pub fn signing_key(&self) -> OnyxResult<Zeroizing<[u8; 32]>> {
        match &self.secret {
            AccountSecret::Phrase(phrase) => Ok(mnemonic::derive_key(phrase.expose_secret())?.secret),
            AccountSecret::PrivateKey(key) => Ok(key.clone()),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.has_phrase() { "phrase" } else { "private_key" };
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("secret", &format_args!("[REDACTED {}]", kind))
            .finish()
    }
}

/// Persistent home of the account and ledger
pub struct AccountStore<S: KeyValueStore> {
    backend: S,
    account: Option<Account>,
    ledger: TransactionLedger,
}

impl<S: KeyValueStore> AccountStore<S> {
    /// Wrap a backend and load whatever it holds
    pub fn open(backend: S) -> OnyxResult<Self> {
        let mut store = Self {
            backend,
            account: None,
            ledger: TransactionLedger::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Reload account and ledger from the backend
    pub fn load(&mut self) -> OnyxResult<Option<&Account>> {
        self.account = None;
        self.ledger = match self.backend.get(keys::TRANSACTIONS)? {
            Some(text) => TransactionLedger::from_json(&text),
            None => TransactionLedger::new(),
        };

        let stored_address: Address = match self.backend.get(keys::ORIGINAL_ADDRESS)? {
            Some(text) => text
                .parse()
                .map_err(|_| OnyxError::storage_error("Stored address is malformed"))?,
            None => return Ok(None),
        };

        let restored = if let Some(phrase) = self.backend.get(keys::ORIGINAL_PHRASE)? {
            Account::from_phrase(&phrase)
        } else if let Some(key) = self.backend.get(keys::PRIVATE_KEY)? {
            Account::from_private_key(&key)
        } else {
            return Err(OnyxError::storage_error("Stored account has no recovery secret"));
        };
        let account = restored.map_err(|e| {
            OnyxError::storage_error("Stored account secret is unreadable").with_details(e.message)
        })?;

        if account.address() != stored_address {
            log_warn!("account", "Stored address does not match its secret", address = stored_address);
            return Err(OnyxError::storage_error("Stored address does not match the stored secret"));
        }

        self.account = Some(account);
        Ok(self.account.as_ref())
    }

    /// Persist `account` as the wallet account, replacing any previous one
    pub fn save(&mut self, account: Account) -> OnyxResult<()> {
        let same_account = self.account.as_ref().map(Account::address) == Some(account.address());
        if !same_account {
            // Address goes first so a half-written replacement reads back as no account
            self.backend.remove(keys::ORIGINAL_ADDRESS)?;
            self.ledger.clear();
            self.backend.remove(keys::TRANSACTIONS)?;
        }

        match &account.secret {
            AccountSecret::Phrase(phrase) => {
                self.backend.set(keys::ORIGINAL_PHRASE, phrase.expose_secret())?;
                self.backend.remove(keys::PRIVATE_KEY)?;
            }
            AccountSecret::PrivateKey(key) => {
                let encoded = Zeroizing::new(hex::encode(key.as_slice()));
                self.backend.set(keys::PRIVATE_KEY, &encoded)?;
                self.backend.remove(keys::ORIGINAL_PHRASE)?;
            }
        }
        self.backend.set(keys::ORIGINAL_ADDRESS, &account.address().to_checksum())?;

        log_info!("account", "Account saved", address = account.address());
        self.account = Some(account);
        Ok(())
    }

    /// Reset: drop the account and ledger and remove every persisted key
    pub fn clear(&mut self) -> OnyxResult<()> {
        self.account = None;
        self.ledger.clear();
        for key in [
            keys::ORIGINAL_ADDRESS,
            keys::ORIGINAL_PHRASE,
            keys::PRIVATE_KEY,
            keys::TRANSACTIONS,
        ] {
            self.backend.remove(key)?;
        }
        log_info!("account", "Account cleared");
        Ok(())
    }

    /// Drop in-memory secrets only; `load` brings them back
    pub fn lock(&mut self) {
        self.account = None;
        self.ledger.clear();
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn require_account(&self) -> OnyxResult<&Account> {
        self.account.as_ref().ok_or_else(OnyxError::no_account)
    }

    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Append to the ledger and persist it. The in-memory ledger only
    /// changes once the backend accepted the write.
    pub fn record_transaction(&mut self, record: TransactionRecord) -> OnyxResult<()> {
        let mut updated = self.ledger.clone();
        updated.append(record);
        self.backend.set(keys::TRANSACTIONS, &updated.to_json())?;
        self.ledger = updated;
        Ok(())
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}
