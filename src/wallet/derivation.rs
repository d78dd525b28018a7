//! Key Derivation
//!
//! Derives the single account key from a BIP-39 seed along the standard
//! Ethereum path, and computes addresses from secp256k1 keys.
//!
//! SECURITY: private key material is zeroized when no longer needed.

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::Network;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::error::{ErrorCode, OnyxError, OnyxResult};
use crate::types::Address;
use crate::utils::crypto::keccak256;

/// BIP-44 path of the wallet account (first address of account 0)
pub const ACCOUNT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Account signing key together with its address
pub struct DerivedKey {
    pub secret: Zeroizing<[u8; 32]>,
    pub address: Address,
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("secret", &"[REDACTED]")
            .field("address", &self.address)
            .finish()
    }
}

/// Derive the account key from a seed
///
/// SECURITY: The seed should be wrapped in Zeroizing by the caller
pub fn derive_account_key(seed: &[u8]) -> OnyxResult<DerivedKey> {
    let secp = Secp256k1::new();
    let master = Xpriv::new_master(Network::Bitcoin, seed)?;
    let path = DerivationPath::from_str(ACCOUNT_DERIVATION_PATH)?;
    let child = master.derive_priv(&secp, &path)?;

    let secret = Zeroizing::new(child.private_key.secret_bytes());
    let address = address_from_secret_key(&secp, &child.private_key);

    Ok(DerivedKey { secret, address })
}

/// Address of a raw 32-byte private key
pub fn address_from_private_key(secret: &[u8; 32]) -> OnyxResult<Address> {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(secret)
        .map_err(|e| OnyxError::new(ErrorCode::InvalidPrivateKey, format!("Invalid private key: {}", e)))?;
    Ok(address_from_secret_key(&secp, &secret_key))
}

/// Parse a hex private key, with or without `0x`
pub fn parse_private_key(key_hex: &str) -> OnyxResult<Zeroizing<[u8; 32]>> {
    let trimmed = key_hex.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let bytes = Zeroizing::new(
        hex::decode(hex_part)
            .map_err(|_| OnyxError::new(ErrorCode::InvalidPrivateKey, "Private key must be hex encoded"))?,
    );
    if bytes.len() != 32 {
        return Err(OnyxError::new(
            ErrorCode::InvalidPrivateKey,
            format!("Private key must be 32 bytes, got {}", bytes.len()),
        ));
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&bytes);
    Ok(secret)
}

fn address_from_secret_key<C: bitcoin::secp256k1::Signing>(
    secp: &Secp256k1<C>,
    secret_key: &SecretKey,
) -> Address {
    let public_key = secret_key.public_key(secp);
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::from_bytes(bytes)
}
