//! SRP-style credential verification for wallet signatures.
//!
//! A true SRP exchange needs a password; wallets give us signatures instead.
//! This module keeps the useful SRP property — the server stores a salted
//! verifier, never the secret — and replaces the password with the wallet's
//! login signature:
//!
//! ```text
//! identifier = lowercase(wallet_address) ‖ ":" ‖ wallet_signature
//! verifier   = Argon2id(identifier, random 32-byte salt)
//! ```
//!
//! A database leak therefore yields neither the signature nor anything a
//! client could replay. Verification recomputes the verifier and compares in
//! constant time.

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::codec;
use crate::crypto::kdf;
use crate::error::{Error, Result};

/// Size of the credential salt in bytes
pub const CREDENTIAL_SALT_SIZE: usize = 32;

/// Argon2id costs for session keys, lighter than the master-key costs since
/// these are short-lived bearer tokens rather than long-term key material
const SESSION_MEMORY_KIB: u32 = 1024;
const SESSION_TIME_COST: u32 = 1;

/// A stored credential: salt plus verifier, both base64
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SrpCredential {
    /// Random 32-byte salt (base64)
    pub salt: String,
    /// Argon2id verifier over the salted identifier (base64, 32 bytes)
    pub verifier: String,
}

/// Generate a fresh credential from a wallet's login signature
pub fn generate(wallet_address: &str, wallet_signature: &str) -> Result<SrpCredential> {
    let salt = codec::random_bytes(CREDENTIAL_SALT_SIZE);
    let verifier = compute_verifier(wallet_address, wallet_signature, &salt)?;

    Ok(SrpCredential {
        salt: codec::encode_base64(&salt),
        verifier: codec::encode_base64(&verifier),
    })
}

/// Verify a wallet signature against a stored credential
///
/// ## Returns
///
/// - `Ok(true)` if the signature reproduces the stored verifier
/// - `Ok(false)` on a mismatch — a wrong signature is an expected outcome,
///   not an error
/// - `Err(CredentialCorrupted)` only when the stored salt or verifier is
///   undecodable
pub fn verify(
    wallet_address: &str,
    wallet_signature: &str,
    credential: &SrpCredential,
) -> Result<bool> {
    let salt = codec::decode_base64(&credential.salt)
        .map_err(|_| Error::CredentialCorrupted("salt is not valid base64".into()))?;
    if salt.len() < 8 {
        return Err(Error::CredentialCorrupted(format!(
            "salt is {} bytes",
            salt.len()
        )));
    }

    let stored: [u8; 32] = codec::decode_base64(&credential.verifier)
        .map_err(|_| Error::CredentialCorrupted("verifier is not valid base64".into()))?
        .as_slice()
        .try_into()
        .map_err(|_| Error::CredentialCorrupted("verifier is not 32 bytes".into()))?;

    let computed = compute_verifier(wallet_address, wallet_signature, &salt)?;

    let matches: bool = computed.ct_eq(&stored).into();
    if !matches {
        debug!(wallet = %wallet_address, "credential verification mismatch");
    }
    Ok(matches)
}

/// Generate a bearer session key after successful verification
///
/// The key binds the wallet, signature, nonce, and current time, then gets
/// stretched so the output carries no recoverable structure. It is an opaque
/// token; the session store owns its lifetime.
pub fn generate_session_key(
    wallet_address: &str,
    wallet_signature: &str,
    nonce: &str,
) -> Result<String> {
    let session_data = format!(
        "{}:{}:{}:{}",
        wallet_address,
        wallet_signature,
        nonce,
        chrono::Utc::now().timestamp_millis(),
    );
    let salt = codec::random_bytes(16);

    let key = kdf::argon2id_derive(
        session_data.as_bytes(),
        &salt,
        SESSION_MEMORY_KIB,
        SESSION_TIME_COST,
    )?;

    Ok(codec::encode_base64(&key))
}

/// Check that a session key is structurally well-formed (base64, 32 bytes)
///
/// Expiry is the session store's concern, not this crate's.
pub fn validate_session_key(session_key: &str) -> bool {
    matches!(codec::decode_base64(session_key), Ok(bytes) if bytes.len() == 32)
}

/// Recompute the verifier for an address/signature pair under a given salt
fn compute_verifier(wallet_address: &str, wallet_signature: &str, salt: &[u8]) -> Result<[u8; 32]> {
    let identifier = format!("{}:{}", wallet_address.to_lowercase(), wallet_signature);
    kdf::argon2id_derive(
        identifier.as_bytes(),
        salt,
        kdf::ARGON2_MEMORY_KIB,
        kdf::ARGON2_TIME_COST,
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0xAbCdEf0123456789";
    const SIGNATURE: &str = "0xdeadbeefcafe";

    #[test]
    fn test_generate_and_verify() {
        let credential = generate(ADDRESS, SIGNATURE).unwrap();
        assert!(verify(ADDRESS, SIGNATURE, &credential).unwrap());
    }

    #[test]
    fn test_wrong_signature_is_ok_false() {
        let credential = generate(ADDRESS, SIGNATURE).unwrap();
        let result = verify(ADDRESS, "0xwrong", &credential);
        assert_eq!(result.unwrap(), false);
    }

    #[test]
    fn test_address_case_insensitive() {
        let credential = generate(ADDRESS, SIGNATURE).unwrap();
        assert!(verify(&ADDRESS.to_uppercase(), SIGNATURE, &credential).unwrap());
        assert!(verify(&ADDRESS.to_lowercase(), SIGNATURE, &credential).unwrap());
    }

    #[test]
    fn test_salts_unique_per_generation() {
        let c1 = generate(ADDRESS, SIGNATURE).unwrap();
        let c2 = generate(ADDRESS, SIGNATURE).unwrap();

        assert_ne!(c1.salt, c2.salt);
        assert_ne!(c1.verifier, c2.verifier);

        // Both remain independently verifiable.
        assert!(verify(ADDRESS, SIGNATURE, &c1).unwrap());
        assert!(verify(ADDRESS, SIGNATURE, &c2).unwrap());
    }

    #[test]
    fn test_corrupted_salt_is_error() {
        let mut credential = generate(ADDRESS, SIGNATURE).unwrap();
        credential.salt = "!!not base64!!".into();

        let err = verify(ADDRESS, SIGNATURE, &credential).unwrap_err();
        assert!(matches!(err, Error::CredentialCorrupted(_)));
    }

    #[test]
    fn test_corrupted_verifier_is_error() {
        let mut credential = generate(ADDRESS, SIGNATURE).unwrap();
        credential.verifier = codec::encode_base64(&[0u8; 16]);

        let err = verify(ADDRESS, SIGNATURE, &credential).unwrap_err();
        assert!(matches!(err, Error::CredentialCorrupted(_)));
    }

    #[test]
    fn test_session_keys_unique() {
        let k1 = generate_session_key(ADDRESS, SIGNATURE, "nonce-1").unwrap();
        let k2 = generate_session_key(ADDRESS, SIGNATURE, "nonce-1").unwrap();

        // Random salt and timestamp make every key unique.
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_session_key_validates() {
        let key = generate_session_key(ADDRESS, SIGNATURE, "nonce").unwrap();
        assert!(validate_session_key(&key));
    }

    #[test]
    fn test_session_key_structure_rejected() {
        assert!(!validate_session_key("not base64!!"));
        assert!(!validate_session_key(&codec::encode_base64(&[0u8; 16])));
        assert!(validate_session_key(&codec::encode_base64(&[0u8; 32])));
    }
}
