//! # Asymmetric Encryption Module
//!
//! Authenticated public-key encryption between a sender's private key and a
//! recipient's public key. Used to wrap per-message session keys: the
//! recipient learns the plaintext, and also that it came from the holder of
//! the sender's private key.
//!
//! ## Sealing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ASYMMETRIC SEALING PIPELINE                          │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Key Agreement                                                 │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  shared = X25519(sender_secret, recipient_public)            │       │
//! │  │                                                              │       │
//! │  │  The recipient computes the same value:                     │       │
//! │  │  shared = X25519(recipient_secret, sender_public)           │       │
//! │  │                                                              │       │
//! │  │  Nobody else can: both private keys stay private.           │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 2: Key Derivation                                                │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  key = HKDF-SHA256(                                          │       │
//! │  │    ikm  = shared,                                            │       │
//! │  │    salt = sender_public ‖ recipient_public,                 │       │
//! │  │    info = "veilmail-box-v1"                                 │       │
//! │  │  )                                                           │       │
//! │  │                                                              │       │
//! │  │  Binding both public keys into the salt ties the derived    │       │
//! │  │  key to this exact sender/recipient pairing and direction.  │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Authenticated Encryption                                      │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  XChaCha20-Poly1305(key, random 24-byte nonce, plaintext)   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Output: EncryptedPayload { ciphertext, nonce }                        │
//! │          (same wire shape as symmetric payloads)                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decryption failure is always [`Error::DecryptionFailed`], with no hint as
//! to whether the keys were wrong or the data corrupted. Structurally
//! malformed input fails earlier as `InvalidPayload` — the two are
//! deliberately distinguishable.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{Error, Result};

use super::keys::{EncryptionKeyPair, PUBLIC_KEY_SIZE};
use super::symmetric::{EncryptedPayload, Nonce};

/// HKDF info label binding derived keys to this construction
const BOX_INFO: &[u8] = b"veilmail-box-v1";

/// Encrypt a plaintext from a sender to a recipient
///
/// Only the holder of `recipient_public`'s private key can open the result,
/// and only with the sender's public key in hand.
pub fn seal(
    plaintext: &[u8],
    sender: &EncryptionKeyPair,
    recipient_public: &[u8; PUBLIC_KEY_SIZE],
) -> Result<EncryptedPayload> {
    let mut key = derive_box_key(
        &sender.diffie_hellman(recipient_public),
        &sender.public_bytes(),
        recipient_public,
    )?;

    let nonce = Nonce::random();
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|_| Error::EncryptionFailed("AEAD sealing failed".into()));
    key.zeroize();

    Ok(EncryptedPayload {
        ciphertext: ciphertext?,
        nonce,
    })
}

/// Decrypt a payload as the recipient, authenticating the sender
///
/// ## Errors
///
/// `DecryptionFailed` whenever the payload cannot be opened, regardless of
/// cause (wrong sender key, wrong recipient, tampered ciphertext).
pub fn open(
    payload: &EncryptedPayload,
    sender_public: &[u8; PUBLIC_KEY_SIZE],
    recipient: &EncryptionKeyPair,
) -> Result<Vec<u8>> {
    let mut key = derive_box_key(
        &recipient.diffie_hellman(sender_public),
        sender_public,
        &recipient.public_bytes(),
    )
    .map_err(|_| Error::DecryptionFailed)?;

    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
    let plaintext = cipher
        .decrypt(
            XNonce::from_slice(payload.nonce.as_bytes()),
            payload.ciphertext.as_slice(),
        )
        .map_err(|_| Error::DecryptionFailed);
    key.zeroize();

    plaintext
}

/// Derive the AEAD key from a DH result and the two public keys involved
fn derive_box_key(
    shared: &[u8; 32],
    sender_public: &[u8; PUBLIC_KEY_SIZE],
    recipient_public: &[u8; PUBLIC_KEY_SIZE],
) -> Result<[u8; 32]> {
    // An all-zero DH output means a low-order public key was supplied.
    if shared == &[0u8; 32] {
        return Err(Error::InvalidKey("low-order public key".into()));
    }

    let mut salt = [0u8; PUBLIC_KEY_SIZE * 2];
    salt[..PUBLIC_KEY_SIZE].copy_from_slice(sender_public);
    salt[PUBLIC_KEY_SIZE..].copy_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(Some(&salt), shared);
    let mut key = [0u8; 32];
    hkdf.expand(BOX_INFO, &mut key)
        .map_err(|_| Error::KeyDerivationFailed("HKDF expansion failed".into()))?;

    Ok(key)
}

// ============================================================================
// TESTS
// ============================================================================
