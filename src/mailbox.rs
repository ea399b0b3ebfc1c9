//! # Mailbox Sealing
//!
//! The transport-facing layer: turns a plaintext mail body into the stored
//! shape and back. Composes the crypto modules, adds nothing cryptographic
//! of its own.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SEALED EMAIL SHAPE                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  {                                                                      │
//! │    "encryptedData": "<EncryptedPayload wire string>",                   │
//! │    "encryptedSessionKeys": {                                            │
//! │      "<base64 recipient pk>": "<wrapped-key wire string>",              │
//! │      ...                                    (sender always included)    │
//! │    },                                                                   │
//! │    "signature": "<base64 Ed25519 signature over the plaintext>",        │
//! │    "size": <byte length of encryptedData>                               │
//! │  }                                                                      │
//! │                                                                         │
//! │  Opening requires the sender's public keys from the key directory:     │
//! │  the X25519 key to unwrap the session key, and (optionally) the        │
//! │  Ed25519 key to verify the signature.                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `size` is the exact byte length of the `encryptedData` string — it is
//! what quota accounting charges, so it must match what is actually stored,
//! not the plaintext length.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec;
use crate::crypto::keys::{EncryptionKeyPair, UserKeys, PUBLIC_KEY_SIZE};
use crate::crypto::session;
use crate::crypto::signing::{self, Signature};
use crate::crypto::symmetric::{self, EncryptedPayload};
use crate::error::{Error, Result};

/// An encrypted email ready for storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedEmail {
    /// Body ciphertext, as an [`EncryptedPayload`] wire string
    #[serde(rename = "encryptedData")]
    pub encrypted_data: String,

    /// Wrapped session key per recipient, keyed by base64 public key
    #[serde(rename = "encryptedSessionKeys")]
    pub encrypted_session_keys: BTreeMap<String, String>,

    /// Sender's Ed25519 signature over the plaintext body (base64)
    pub signature: String,

    /// Byte length of `encrypted_data`, for quota accounting
    pub size: u64,
}

/// Seal a mail body for a set of recipients
///
/// The sender is always added as a recipient so the sent copy stays
/// readable. All-or-nothing: if any recipient key is unusable the whole
/// send fails with [`Error::PartialWrap`] naming the offenders, because a
/// mail silently unreadable by some recipients is worse than a bounced one.
///
/// ## Parameters
///
/// - `body`: Plaintext mail body bytes
/// - `sender`: The sender's unlocked keys
/// - `recipient_keys`: Base64 X25519 public keys from the key directory
pub fn seal_email(
    body: &[u8],
    sender: &UserKeys,
    recipient_keys: &[String],
) -> Result<SealedEmail> {
    let session_key = session::generate_session_key();

    let encrypted_data = symmetric::encrypt(body, &session_key, None)?.to_wire_string()?;

    let mut all_recipients = recipient_keys.to_vec();
    let sender_pk = codec::encode_base64(&sender.encryption.public_bytes());
    if !all_recipients.contains(&sender_pk) {
        all_recipients.push(sender_pk);
    }

    let encrypted_session_keys =
        session::wrap_for_recipients(&session_key, &sender.encryption, &all_recipients)
            .require_complete()?;

    let signature = signing::sign(&sender.signing, body).to_base64();

    let size = encrypted_data.len() as u64;
    debug!(recipients = encrypted_session_keys.len(), size, "sealed email");

    Ok(SealedEmail {
        encrypted_data,
        encrypted_session_keys,
        signature,
        size,
    })
}

/// Open a sealed email as one of its recipients
///
/// `sender_encryption_key` is the sender's base64 X25519 public key from the
/// key directory; it is needed to unwrap the session key. If
/// `sender_signing_key` is also given (base64 Ed25519 public key), the
/// body's signature is verified and a mismatch is fatal.
pub fn open_email(
    email: &SealedEmail,
    recipient: &EncryptionKeyPair,
    sender_encryption_key: &str,
    sender_signing_key: Option<&str>,
) -> Result<Vec<u8>> {
    let own_pk = codec::encode_base64(&recipient.public_bytes());
    let wrapped = email.encrypted_session_keys.get(&own_pk).ok_or_else(|| {
        Error::InvalidPayload(format!("no wrapped session key for recipient {}", own_pk))
    })?;

    let sender_public: [u8; PUBLIC_KEY_SIZE] = codec::decode_base64_array(sender_encryption_key)?;
    let session_key = session::unwrap_session_key(wrapped, &sender_public, recipient)?;

    let payload = EncryptedPayload::from_wire_string(&email.encrypted_data)?;
    let body = symmetric::decrypt(&payload, &session_key, None)?;

    if let Some(sender_key) = sender_signing_key {
        let public: [u8; PUBLIC_KEY_SIZE] = codec::decode_base64_array(sender_key)?;
        let signature = Signature::from_base64(&email.signature)?;
        signing::verify(&public, &body, &signature)?;
    }

    Ok(body)
}

// ============================================================================
// TESTS
// ============================================================================
