//! # Key Derivation Functions
//!
//! This module turns a wallet signature into the symmetric keys that protect
//! the user's private-key bundle.
//!
//! ## Key Derivation Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KEY DERIVATION HIERARCHY                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    WALLET SIGNATURE                             │   │
//! │  │                                                                 │   │
//! │  │  Signature over the deterministic key-derivation challenge:    │   │
//! │  │                                                                 │   │
//! │  │  "Sign this message to derive your encryption keys. ..."       │   │
//! │  │                                                                 │   │
//! │  │  • Reproducible: same wallet + same text → same signature      │   │
//! │  │  • Never leaves the client, never stored anywhere              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    ARGON2ID (memory-hard)                       │   │
//! │  │                                                                 │   │
//! │  │  Argon2id(                                                      │   │
//! │  │    password = signature_bytes,                                  │   │
//! │  │    salt = master_salt (16 random bytes, stored server-side),   │   │
//! │  │    time = 3, memory = 4096 KiB, parallelism = 1,               │   │
//! │  │    output = 32 bytes                                           │   │
//! │  │  )                                                              │   │
//! │  │                                                                 │   │
//! │  │  → 256-bit MASTER KEY                                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HKDF-SHA256 EXPANSION                        │   │
//! │  │                                                                 │   │
//! │  │  HKDF-SHA256(                                                   │   │
//! │  │    ikm = master_key,                                            │   │
//! │  │    salt = purpose_salt (random, stored alongside),             │   │
//! │  │    info = domain label                                          │   │
//! │  │  )                                                              │   │
//! │  │                                                                 │   │
//! │  │  → 32-byte purpose key (bundle encryption, storage, ...)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice | Rationale |
//! |--------|---------------|-----------|
//! | Stretching | Argon2id | Memory-hard; signatures are high-entropy but the cost still blunts bulk attacks |
//! | Expansion | HKDF-SHA256 | Well-analyzed; one master key fans out to independent purpose keys |
//! | Key Separation | Different `info` strings | Prevents key reuse across purposes |
//! | Version String | "-v1" suffix | Allows future algorithm upgrades |
//!
//! The signature itself is never used as key material directly, and the raw
//! master key never leaves this module's output types un-zeroized.

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use sha2::Sha256;

use crate::codec;
use crate::error::{Error, Result};

use super::symmetric::SymmetricKey;

/// Length of a freshly generated master salt in bytes
pub const MASTER_SALT_SIZE: usize = 16;

/// Minimum accepted length for a stored salt
pub const MASTER_SALT_MIN: usize = 16;

/// Maximum accepted length for a stored salt
pub const MASTER_SALT_MAX: usize = 32;

// Argon2id costs for master-key derivation. 4 MiB / 3 passes matches what
// browser clients can afford per unlock while still being memory-hard.
// Changing these breaks every derived key.

/// Argon2id memory cost in KiB
pub const ARGON2_MEMORY_KIB: u32 = 4096;

/// Argon2id iteration count
pub const ARGON2_TIME_COST: u32 = 3;

/// Argon2id parallelism degree
pub const ARGON2_PARALLELISM: u32 = 1;

/// Domain separation strings for HKDF
///
/// These ensure that keys derived for different purposes are cryptographically
/// independent, even when expanded from the same master key.
pub mod domain {
    /// Domain for the private-key-bundle encryption key
    pub const PRIVATE_KEYS: &[u8] = b"veilmail-private-keys-v1";

    /// Domain for local storage-blob encryption keys
    pub const STORAGE: &[u8] = b"veilmail-storage-v1";
}

/// Generate a fresh random master salt
pub fn generate_salt() -> [u8; MASTER_SALT_SIZE] {
    codec::random_array()
}

/// Check that a stored salt has a usable length
pub fn validate_salt(salt: &[u8]) -> Result<()> {
    if salt.len() < MASTER_SALT_MIN || salt.len() > MASTER_SALT_MAX {
        return Err(Error::InvalidSalt(salt.len()));
    }
    Ok(())
}

/// Derive the master key from a wallet signature
///
/// Deterministic: the same signature and salt always produce the same key,
/// which is what makes wallet-only key recovery possible.
///
/// ## Parameters
///
/// - `signature`: The wallet's signature over the key-derivation challenge,
///   in whatever text form the wallet returned it (typically "0x…" hex)
/// - `salt`: The stored master salt (16-32 bytes)
///
/// ## Example
///
/// ```ignore
/// let salt = kdf::generate_salt();
/// let master = kdf::derive_master_key(&signature, &salt)?;
/// ```
pub fn derive_master_key(signature: &str, salt: &[u8]) -> Result<SymmetricKey> {
    validate_salt(salt)?;

    let output = argon2id_derive(
        signature.as_bytes(),
        salt,
        ARGON2_MEMORY_KIB,
        ARGON2_TIME_COST,
    )?;

    Ok(SymmetricKey::from_bytes(output))
}

/// Expand a purpose key from the master key
///
/// ## Parameters
///
/// - `master`: The Argon2id-derived master key
/// - `salt`: A per-purpose random salt, stored alongside the data it protects
/// - `info`: A [`domain`] label naming the purpose
pub fn expand_key(master: &SymmetricKey, salt: &[u8], info: &[u8]) -> Result<SymmetricKey> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), master.as_bytes());

    let mut key = [0u8; 32];
    hkdf.expand(info, &mut key)
        .map_err(|_| Error::KeyDerivationFailed("HKDF expansion failed".into()))?;

    Ok(SymmetricKey::from_bytes(key))
}

/// Run Argon2id with explicit cost parameters
///
/// Shared by master-key derivation and the credential verifier, which uses
/// lighter costs for its bearer tokens.
pub(crate) fn argon2id_derive(
    input: &[u8],
    salt: &[u8],
    memory_kib: u32,
    time_cost: u32,
) -> Result<[u8; 32]> {
    let params = Params::new(memory_kib, time_cost, ARGON2_PARALLELISM, Some(32))
        .map_err(|e| Error::KeyDerivationFailed(format!("invalid Argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(input, salt, &mut output)
        .map_err(|e| Error::KeyDerivationFailed(format!("Argon2id failed: {}", e)))?;

    Ok(output)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE: &str = "0xdeadbeefcafe00112233445566778899aabbccddeeff";

    #[test]
    fn test_master_key_deterministic() {
        // The canonical all-zero salt is "AAAAAAAAAAAAAAAAAAAAAA==" in base64.
        let salt = codec::decode_base64("AAAAAAAAAAAAAAAAAAAAAA==").unwrap();
        assert_eq!(salt, vec![0u8; 16]);

        let key1 = derive_master_key(SIGNATURE, &salt).unwrap();
        let key2 = derive_master_key(SIGNATURE, &salt).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_signatures_different_keys() {
        let salt = [0u8; 16];

        let key1 = derive_master_key(SIGNATURE, &salt).unwrap();
        let key2 = derive_master_key("0xother", &salt).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salts_different_keys() {
        let key1 = derive_master_key(SIGNATURE, &[0u8; 16]).unwrap();
        let key2 = derive_master_key(SIGNATURE, &[1u8; 16]).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_salt_length_bounds() {
        assert!(derive_master_key(SIGNATURE, &[0u8; 15]).is_err());
        assert!(derive_master_key(SIGNATURE, &[0u8; 33]).is_err());
        assert!(derive_master_key(SIGNATURE, &[0u8; 16]).is_ok());
        assert!(derive_master_key(SIGNATURE, &[0u8; 32]).is_ok());

        let err = derive_master_key(SIGNATURE, &[0u8; 8]).unwrap_err();
        assert!(matches!(err, Error::InvalidSalt(8)));
    }

    #[test]
    fn test_generated_salts_unique() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), MASTER_SALT_SIZE);
        assert_ne!(a, b);
    }

    #[test]
    fn test_expand_domain_separation() {
        let master = SymmetricKey::from_bytes([42u8; 32]);
        let salt = [7u8; 16];

        let bundle_key = expand_key(&master, &salt, domain::PRIVATE_KEYS).unwrap();
        let storage_key = expand_key(&master, &salt, domain::STORAGE).unwrap();

        assert_ne!(bundle_key.as_bytes(), storage_key.as_bytes());
    }

    #[test]
    fn test_expand_salt_separation() {
        let master = SymmetricKey::from_bytes([42u8; 32]);

        let key1 = expand_key(&master, &[1u8; 16], domain::PRIVATE_KEYS).unwrap();
        let key2 = expand_key(&master, &[2u8; 16], domain::PRIVATE_KEYS).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_expand_deterministic() {
        let master = SymmetricKey::from_bytes([42u8; 32]);
        let salt = [7u8; 16];

        let key1 = expand_key(&master, &salt, domain::PRIVATE_KEYS).unwrap();
        let key2 = expand_key(&master, &salt, domain::PRIVATE_KEYS).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }
}
