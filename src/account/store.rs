//! Key-Value Persistence Backends
//!
//! The account store persists a handful of string values. Backends implement
//! [`KeyValueStore`]; values read back are wrapped in `Zeroizing` because some
//! of them are secrets.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{ErrorCode, OnyxError};

/// Persisted key names
pub mod keys {
    pub const ORIGINAL_ADDRESS: &str = "originalAddress";
    pub const ORIGINAL_PHRASE: &str = "originalPhrase";
    pub const PRIVATE_KEY: &str = "privateKey";
    pub const TRANSACTIONS: &str = "transactions";
}

/// Storage backend errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to encode store: {0}")]
    Encode(String),
}

impl From<StoreError> for OnyxError {
    fn from(e: StoreError) -> Self {
        OnyxError::new(ErrorCode::StorageError, e.to_string())
    }
}

/// String key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

fn zeroize_values(map: &mut HashMap<String, String>) {
    for value in map.values_mut() {
        value.zeroize();
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Process-local store, mostly for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        Ok(self.entries.get(key).map(|v| Zeroizing::new(v.clone())))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(mut old) = self.entries.insert(key.to_string(), value.to_string()) {
            old.zeroize();
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if let Some(mut old) = self.entries.remove(key) {
            old.zeroize();
        }
        Ok(())
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        zeroize_values(&mut self.entries);
    }
}

// =============================================================================
// File backend
// =============================================================================

/// JSON object file, rewritten atomically on every change.
///
/// SECURITY: the file holds the recovery phrase in plaintext; it is created
/// with owner-only permissions on Unix.
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(mut text) => {
                let parsed: Result<HashMap<String, String>, _> = serde_json::from_str(&text)
                    .map_err(|e| StoreError::Corrupt(e.to_string()));
                text.zeroize();
                parsed?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let encoded = Zeroizing::new(
            serde_json::to_string_pretty(&self.entries).map_err(|e| StoreError::Encode(e.to_string()))?,
        );

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
            set_secure_file_permissions(&tmp_path).map_err(io_err)?;
            file.write_all(encoded.as_bytes()).map_err(io_err)?;
            file.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        Ok(self.entries.get(key).map(|v| Zeroizing::new(v.clone())))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(mut old) = self.entries.insert(key.to_string(), value.to_string()) {
            old.zeroize();
        }
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self.entries.remove(key) {
            Some(mut old) => {
                old.zeroize();
                self.flush()
            }
            None => Ok(()),
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        zeroize_values(&mut self.entries);
    }
}

fn set_secure_file_permissions(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
