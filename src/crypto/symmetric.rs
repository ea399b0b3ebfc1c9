//! # Symmetric Encryption Module
//!
//! Provides XChaCha20-Poly1305 authenticated encryption for the private-key
//! bundle, message bodies, and storage blobs.
//!
//! ## Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SYMMETRIC ENCRYPTION FLOW                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Step 1: Generate Nonce (unique per call)                              │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  Random 24 bytes from the OS CSPRNG                          │       │
//! │  │  (Never reuse a nonce with the same key!)                   │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 2: Bind Context (optional)                                       │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  message = "{context}:" || plaintext                         │       │
//! │  │                                                              │       │
//! │  │  The label travels inside the authenticated plaintext, so   │       │
//! │  │  a ciphertext sealed for one purpose cannot be replayed     │       │
//! │  │  into another.                                              │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Step 3: Encrypt                                                       │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  XChaCha20-Poly1305(                                         │       │
//! │  │    key = 256-bit symmetric key,                             │       │
//! │  │    nonce = random 24 bytes,                                 │       │
//! │  │    plaintext = message                                      │       │
//! │  │  )                                                          │       │
//! │  │           ↓                                                  │       │
//! │  │  Ciphertext + 16-byte Auth Tag                              │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  Output: EncryptedPayload { ciphertext, nonce }                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | Only holders of the symmetric key can read the data |
//! | Integrity | Any modification of ciphertext or nonce is detected |
//! | Domain separation | Context-bound payloads fail to open under another label |
//! | Nonce safety | 192-bit random nonces; callers can never supply their own |

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::codec;
use crate::error::{Error, Result};

/// Size of the XChaCha20-Poly1305 nonce in bytes (192 bits)
pub const NONCE_SIZE: usize = 24;

/// Size of the Poly1305 authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A nonce (number used once) for XChaCha20-Poly1305
///
/// ## Critical Security Requirement
///
/// **NEVER reuse a nonce with the same key!**
///
/// Nonce reuse breaks the AEAD completely: it allows recovering the
/// authentication key and forging messages. Nonces are always drawn fresh
/// from the OS CSPRNG inside [`encrypt`]; 192 bits is wide enough that
/// random generation is safe for any realistic message volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random nonce
    pub fn random() -> Self {
        Self(codec::random_array())
    }

    /// Create from existing bytes (deserialization only)
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// A 256-bit symmetric key
///
/// Zeroized when dropped. This is the output type of the KDF chain and the
/// input type of both symmetric encryption and session-key wrapping.
#[derive(ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        Self(codec::random_array())
    }

    /// Decode from a base64 wire string
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = codec::decode_base64(encoded)?;
        let bytes: [u8; KEY_SIZE] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| Error::InvalidKey(format!("key must be {} bytes, got {}", KEY_SIZE, bytes.len())))?;
        Ok(Self(bytes))
    }

    /// Encode as a base64 wire string
    pub fn to_base64(&self) -> String {
        codec::encode_base64(&self.0)
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

// Key bytes must never reach logs or panic messages.
impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// An encrypted payload: ciphertext plus the nonce it was sealed under
///
/// The wire form is a JSON object with base64 fields, matching what the
/// collaborator stores verbatim:
///
/// ```json
/// { "ciphertext": "…base64…", "nonce": "…base64…" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Ciphertext including the appended authentication tag
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,

    /// The 24-byte nonce used for this payload
    #[serde(with = "base64_nonce")]
    pub nonce: Nonce,
}

impl EncryptedPayload {
    /// Serialize to the JSON wire string the collaborator persists
    pub fn to_wire_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a payload from its JSON wire string
    ///
    /// Structural problems (bad JSON, bad base64, wrong nonce length) are
    /// reported as `InvalidPayload`, never as an authentication failure.
    pub fn from_wire_string(wire: &str) -> Result<Self> {
        serde_json::from_str(wire)
            .map_err(|e| Error::InvalidPayload(format!("malformed encrypted payload: {}", e)))
    }
}

/// Encrypt a plaintext under a symmetric key
///
/// A fresh random nonce is generated on every call; there is deliberately no
/// way for a caller to supply one.
///
/// ## Parameters
///
/// - `plaintext`: Data to encrypt
/// - `key`: 256-bit symmetric key
/// - `context`: Optional domain label bound into the authenticated plaintext
///
/// ## Example
///
/// ```ignore
/// let key = SymmetricKey::generate();
/// let payload = encrypt(b"private key bundle", &key, Some("UserPrivateKeys"))?;
/// ```
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey, context: Option<&str>) -> Result<EncryptedPayload> {
    let nonce = Nonce::random();
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let message = match context {
        Some(label) => {
            let mut m = Vec::with_capacity(label.len() + 1 + plaintext.len());
            m.extend_from_slice(label.as_bytes());
            m.push(b':');
            m.extend_from_slice(plaintext);
            m
        }
        None => plaintext.to_vec(),
    };

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce.0), message.as_slice())
        .map_err(|_| Error::EncryptionFailed("AEAD sealing failed".into()))?;

    Ok(EncryptedPayload { ciphertext, nonce })
}

/// Decrypt a payload with a symmetric key
///
/// ## Errors
///
/// Returns `AuthenticationFailed` if the tag does not verify **or** the
/// embedded context label does not match `context`. The two cases are
/// intentionally indistinguishable.
pub fn decrypt(payload: &EncryptedPayload, key: &SymmetricKey, context: Option<&str>) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let message = cipher
        .decrypt(XNonce::from_slice(&payload.nonce.0), payload.ciphertext.as_slice())
        .map_err(|_| Error::AuthenticationFailed)?;

    match context {
        Some(label) => {
            let prefix_len = label.len() + 1;
            let matches = message.len() >= prefix_len
                && &message[..label.len()] == label.as_bytes()
                && message[label.len()] == b':';
            if !matches {
                return Err(Error::AuthenticationFailed);
            }
            Ok(message[prefix_len..].to_vec())
        }
        None => Ok(message),
    }
}

/// Seal a raw byte blob for storage as `nonce || ciphertext`
///
/// Used for large attachment blobs where a self-delimiting byte stream is
/// more convenient than the JSON payload form.
pub fn seal_blob(data: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    let payload = encrypt(data, key, None)?;
    let mut out = Vec::with_capacity(NONCE_SIZE + payload.ciphertext.len());
    out.extend_from_slice(payload.nonce.as_bytes());
    out.extend_from_slice(&payload.ciphertext);
    Ok(out)
}

/// Open a `nonce || ciphertext` storage blob
pub fn open_blob(blob: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::InvalidPayload(format!(
            "storage blob too short: {} bytes",
            blob.len()
        )));
    }
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&blob[..NONCE_SIZE]);
    let payload = EncryptedPayload {
        ciphertext: blob[NONCE_SIZE..].to_vec(),
        nonce: Nonce::from_bytes(nonce),
    };
    decrypt(&payload, key, None)
}

/// Serde helper for base64-encoded byte vectors
mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::codec;

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::encode_base64(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        codec::decode_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for the base64-encoded fixed-size nonce
mod base64_nonce {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Nonce, NONCE_SIZE};
    use crate::codec;

    pub fn serialize<S>(nonce: &Nonce, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::encode_base64(nonce.as_bytes()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Nonce, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes: [u8; NONCE_SIZE] =
            codec::decode_base64_array(&s).map_err(serde::de::Error::custom)?;
        Ok(Nonce::from_bytes(bytes))
    }
}

// ============================================================================
// TESTS
// ============================================================================
