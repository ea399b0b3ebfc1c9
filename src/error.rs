//! # Error Handling
//!
//! This module provides the error types for VeilMail Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Derivation Errors                                                 │
//! │  │   ├── KeyDerivationFailed   - Argon2/HKDF internal failure          │
//! │  │   └── InvalidSalt           - Stored salt has the wrong length      │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - AEAD sealing failed                   │
//! │  │   ├── AuthenticationFailed  - Tag or context-label mismatch         │
//! │  │   ├── DecryptionFailed      - Wrong keys or corrupted data          │
//! │  │   ├── InvalidKey            - Key bytes have the wrong shape        │
//! │  │   ├── InvalidPayload        - Malformed wire payload (not an        │
//! │  │   │                           authentication failure)               │
//! │  │   └── VerificationFailed    - Ed25519 signature did not verify      │
//! │  │                                                                      │
//! │  ├── Session Errors                                                    │
//! │  │   └── PartialWrap           - Some recipients could not be wrapped  │
//! │  │                                                                      │
//! │  ├── Auth Errors                                                       │
//! │  │   ├── ChallengeExpired      - Login challenge outside its window    │
//! │  │   └── CredentialCorrupted   - Stored salt/verifier undecodable      │
//! │  │                                                                      │
//! │  └── Account Errors                                                    │
//! │      ├── SetupConflict         - Keys already provisioned              │
//! │      └── KeysNotFound          - No encrypted keys stored yet          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two taxonomy rules matter more than the variants themselves:
//!
//! 1. `AuthenticationFailed` and `DecryptionFailed` never reveal *why* a
//!    payload failed to open (wrong key vs. tampered ciphertext vs. context
//!    mismatch). Distinguishing those would hand an oracle to an attacker.
//! 2. A credential mismatch is **not** an error. `auth::srp::verify` returns
//!    `Ok(false)` for a wrong signature and reserves `Err` for corrupted
//!    stored state.

use thiserror::Error;

/// Result type alias for VeilMail Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for VeilMail Core
///
/// All errors are categorized by module/domain to make error handling
/// clearer and to provide meaningful error messages to users.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Derivation Errors (100-199)
    // ========================================================================

    /// Key derivation failed inside Argon2 or HKDF
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    /// A persisted salt has an unusable length
    #[error("Invalid salt length: {0} bytes (expected 16-32)")]
    InvalidSalt(usize),

    // ========================================================================
    // Crypto Errors (200-299)
    // ========================================================================

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// AEAD tag did not verify, or the bound context label did not match.
    /// Deliberately carries no detail: wrong keys and corrupted data are
    /// indistinguishable to the caller.
    #[error("Authentication failed: wrong keys or corrupted data")]
    AuthenticationFailed,

    /// Public-key decryption failed (wrong keys or corrupted data)
    #[error("Decryption failed: wrong keys or corrupted data")]
    DecryptionFailed,

    /// Key bytes have the wrong length or encoding
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A wire payload is structurally malformed (bad base64, bad JSON,
    /// truncated nonce). Distinct from authentication failure by design.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// An Ed25519 signature did not verify
    #[error("Signature verification failed")]
    VerificationFailed,

    // ========================================================================
    // Session Errors (300-399)
    // ========================================================================

    /// One or more recipients could not be wrapped during session-key
    /// distribution. Names the offending recipient keys.
    #[error("Failed to wrap session key for {} recipient(s)", failed.len())]
    PartialWrap {
        /// Base64 public keys of the recipients that failed
        failed: Vec<String>,
    },

    // ========================================================================
    // Auth Errors (400-499)
    // ========================================================================

    /// Login challenge is outside its validity window. A negative age means
    /// the timestamp is from the future beyond the skew tolerance.
    #[error("Login challenge expired (age {age_seconds}s)")]
    ChallengeExpired {
        /// Seconds elapsed since the challenge was issued
        age_seconds: i64,
    },

    /// Stored SRP credential state is undecodable. This is a data-integrity
    /// problem on the collaborator's side, never a wrong-signature signal.
    #[error("Stored credential is corrupted: {0}")]
    CredentialCorrupted(String),

    // ========================================================================
    // Account Errors (500-599)
    // ========================================================================

    /// Encryption keys are already provisioned for this identity
    #[error("Encryption keys already set up for this user")]
    SetupConflict,

    /// No encrypted keys stored for this identity
    #[error("Encryption keys not found")]
    KeysNotFound,

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code for the API boundary
    ///
    /// Error codes are organized by category:
    /// - 100-199: Derivation
    /// - 200-299: Crypto
    /// - 300-399: Session distribution
    /// - 400-499: Auth
    /// - 500-599: Account
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Derivation (100-199)
            Error::KeyDerivationFailed(_) => 100,
            Error::InvalidSalt(_) => 101,

            // Crypto (200-299)
            Error::EncryptionFailed(_) => 200,
            Error::AuthenticationFailed => 201,
            Error::DecryptionFailed => 202,
            Error::InvalidKey(_) => 203,
            Error::InvalidPayload(_) => 204,
            Error::VerificationFailed => 205,

            // Session (300-399)
            Error::PartialWrap { .. } => 300,

            // Auth (400-499)
            Error::ChallengeExpired { .. } => 400,
            Error::CredentialCorrupted(_) => 401,

            // Account (500-599)
            Error::SetupConflict => 500,
            Error::KeysNotFound => 501,

            // Internal (900-999)
            Error::SerializationError(_) => 900,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
