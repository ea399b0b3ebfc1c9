//! # Session Key Distribution
//!
//! Every mail body is encrypted exactly once under a random session key.
//! That key is then wrapped separately for each recipient (and the sender,
//! so the sent-mail copy stays readable) using asymmetric sealing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SESSION KEY DISTRIBUTION                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │        session_key (32 random bytes, one per message)                  │
//! │              │                                                          │
//! │    ┌─────────┼──────────────┬──────────────┐                           │
//! │    ▼         ▼              ▼              ▼                           │
//! │  seal(pk_A)  seal(pk_B)   seal(pk_C)    seal(pk_sender)                │
//! │    │         │    (each with the sender's private key)                 │
//! │    ▼         ▼              ▼              ▼                           │
//! │  { "base64(pk_A)": wrapped_A,                                          │
//! │    "base64(pk_B)": wrapped_B, ... }                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wrapping is best-effort per recipient: one bad directory entry must not
//! block the other recipients. The report records who failed; callers that
//! need all-or-nothing use [`WrapReport::require_complete`].

use std::collections::BTreeMap;

use tracing::warn;

use crate::codec;
use crate::error::{Error, Result};

use super::asymmetric;
use super::keys::{EncryptionKeyPair, PUBLIC_KEY_SIZE};
use super::symmetric::{EncryptedPayload, SymmetricKey, KEY_SIZE};

/// Generate a fresh random session key for one message
pub fn generate_session_key() -> SymmetricKey {
    SymmetricKey::generate()
}

/// The outcome of wrapping a session key for a set of recipients
///
/// `wrapped` maps each recipient's base64 encryption public key to the
/// payload wire string that only they (knowing the sender's public key)
/// can open.
#[derive(Debug, Default)]
pub struct WrapReport {
    /// Successfully wrapped keys, keyed by base64 recipient public key
    pub wrapped: BTreeMap<String, String>,

    /// Recipients (base64 public keys, as supplied) that could not be wrapped
    pub failed: Vec<String>,
}

impl WrapReport {
    /// True if every requested recipient was wrapped
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Convert to all-or-nothing: the wrapped map, or `PartialWrap`
    pub fn require_complete(self) -> Result<BTreeMap<String, String>> {
        if self.failed.is_empty() {
            Ok(self.wrapped)
        } else {
            Err(Error::PartialWrap { failed: self.failed })
        }
    }
}

/// Wrap a session key for each recipient public key
///
/// ## Parameters
///
/// - `session_key`: The per-message symmetric key
/// - `sender`: The sender's encryption keypair (authenticates the wrapping)
/// - `recipients`: Base64-encoded X25519 public keys from the key directory
///
/// Duplicate recipients collapse to a single map entry. Malformed or
/// low-order keys land in `failed` without aborting the rest.
pub fn wrap_for_recipients(
    session_key: &SymmetricKey,
    sender: &EncryptionKeyPair,
    recipients: &[String],
) -> WrapReport {
    let mut report = WrapReport::default();

    for recipient in recipients {
        match wrap_for_recipient(session_key, sender, recipient) {
            Ok(wire) => {
                report.wrapped.insert(recipient.clone(), wire);
            }
            Err(e) => {
                warn!(recipient = %recipient, error = %e, "failed to wrap session key");
                report.failed.push(recipient.clone());
            }
        }
    }

    report
}

/// Wrap a session key for a single base64 recipient public key
pub fn wrap_for_recipient(
    session_key: &SymmetricKey,
    sender: &EncryptionKeyPair,
    recipient: &str,
) -> Result<String> {
    let public: [u8; PUBLIC_KEY_SIZE] = codec::decode_base64_array(recipient)
        .map_err(|_| Error::InvalidKey(format!("invalid recipient public key: {}", recipient)))?;

    let sealed = asymmetric::seal(session_key.as_bytes(), sender, &public)?;
    sealed.to_wire_string()
}

/// Unwrap a session key with the recipient's private keypair
///
/// `wire` is the payload wire string stored under this recipient's public
/// key in the message's wrapped-keys map; `sender_public` is the sender's
/// X25519 key from the directory.
pub fn unwrap_session_key(
    wire: &str,
    sender_public: &[u8; PUBLIC_KEY_SIZE],
    recipient: &EncryptionKeyPair,
) -> Result<SymmetricKey> {
    let sealed = EncryptedPayload::from_wire_string(wire)?;
    let bytes = asymmetric::open(&sealed, sender_public, recipient)?;

    let bytes: [u8; KEY_SIZE] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidKey(format!("unwrapped key is {} bytes", bytes.len())))?;

    Ok(SymmetricKey::from_bytes(bytes))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn base64_pk(kp: &EncryptionKeyPair) -> String {
        codec::encode_base64(&kp.public_bytes())
    }

    #[test]
    fn test_session_keys_unique() {
        let k1 = generate_session_key();
        let k2 = generate_session_key();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_wrap_unwrap_single_recipient() {
        let sender = EncryptionKeyPair::generate();
        let recipient = EncryptionKeyPair::generate();
        let session_key = generate_session_key();

        let wire = wrap_for_recipient(&session_key, &sender, &base64_pk(&recipient)).unwrap();
        let unwrapped = unwrap_session_key(&wire, &sender.public_bytes(), &recipient).unwrap();

        assert_eq!(unwrapped.as_bytes(), session_key.as_bytes());
    }

    #[test]
    fn test_wrap_for_multiple_recipients() {
        let sender = EncryptionKeyPair::generate();
        let recipients: Vec<EncryptionKeyPair> =
            (0..3).map(|_| EncryptionKeyPair::generate()).collect();
        let keys: Vec<String> = recipients.iter().map(base64_pk).collect();
        let session_key = generate_session_key();

        let report = wrap_for_recipients(&session_key, &sender, &keys);
        assert!(report.is_complete());
        assert_eq!(report.wrapped.len(), 3);

        // Every recipient can recover the same session key from their entry.
        for (kp, pk) in recipients.iter().zip(&keys) {
            let wire = &report.wrapped[pk];
            let unwrapped = unwrap_session_key(wire, &sender.public_bytes(), kp).unwrap();
            assert_eq!(unwrapped.as_bytes(), session_key.as_bytes());
        }
    }

    #[test]
    fn test_recipient_cannot_open_anothers_entry() {
        let sender = EncryptionKeyPair::generate();
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let keys = vec![base64_pk(&alice), base64_pk(&bob)];
        let session_key = generate_session_key();

        let report = wrap_for_recipients(&session_key, &sender, &keys);

        let result = unwrap_session_key(
            &report.wrapped[&base64_pk(&alice)],
            &sender.public_bytes(),
            &bob,
        );
        assert!(matches!(result.unwrap_err(), Error::DecryptionFailed));
    }

    #[test]
    fn test_bad_recipient_does_not_block_others() {
        let sender = EncryptionKeyPair::generate();
        let good = EncryptionKeyPair::generate();
        let keys = vec![
            base64_pk(&good),
            "not base64!!".to_string(),
            codec::encode_base64(&[0u8; 16]), // wrong length
        ];
        let session_key = generate_session_key();

        let report = wrap_for_recipients(&session_key, &sender, &keys);

        assert_eq!(report.wrapped.len(), 1);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_complete());

        let unwrapped = unwrap_session_key(
            &report.wrapped[&base64_pk(&good)],
            &sender.public_bytes(),
            &good,
        )
        .unwrap();
        assert_eq!(unwrapped.as_bytes(), session_key.as_bytes());
    }

    #[test]
    fn test_require_complete() {
        let sender = EncryptionKeyPair::generate();
        let good = EncryptionKeyPair::generate();
        let session_key = generate_session_key();

        let ok = wrap_for_recipients(&session_key, &sender, &[base64_pk(&good)]);
        assert!(ok.require_complete().is_ok());

        let bad = wrap_for_recipients(&session_key, &sender, &["broken".to_string()]);
        let err = bad.require_complete().unwrap_err();
        assert!(matches!(err, Error::PartialWrap { ref failed } if failed.len() == 1));
    }

    #[test]
    fn test_duplicate_recipients_collapse() {
        let sender = EncryptionKeyPair::generate();
        let recipient = EncryptionKeyPair::generate();
        let pk = base64_pk(&recipient);
        let session_key = generate_session_key();

        let report = wrap_for_recipients(&session_key, &sender, &[pk.clone(), pk]);
        assert_eq!(report.wrapped.len(), 1);
        assert!(report.is_complete());
    }

    #[test]
    fn test_unwrapped_wrong_length_rejected() {
        let sender = EncryptionKeyPair::generate();
        let recipient = EncryptionKeyPair::generate();

        // Seal something that is not a 32-byte key.
        let sealed = asymmetric::seal(b"too short", &sender, &recipient.public_bytes()).unwrap();
        let result = unwrap_session_key(
            &sealed.to_wire_string().unwrap(),
            &sender.public_bytes(),
            &recipient,
        );

        assert!(matches!(result.unwrap_err(), Error::InvalidKey(_)));
    }
}
