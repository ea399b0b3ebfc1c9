//! # Key Management
//!
//! This module handles generation and wire encoding of the user's keypairs.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  EncryptionKeyPair (X25519)                                     │   │
//! │  │  ─────────────────────────────                                   │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Receiving wrapped session keys (ECDH)                        │   │
//! │  │  • Deriving shared secrets for E2E mail encryption              │   │
//! │  │                                                                  │   │
//! │  │  Format:                                                        │   │
//! │  │  • Private key: 32 bytes (kept secret, zeroized on drop)       │   │
//! │  │  • Public key: 32 bytes (published in the key directory)       │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SigningKeyPair (Ed25519)                                       │   │
//! │  │  ─────────────────────────                                       │   │
//! │  │                                                                  │   │
//! │  │  Purpose:                                                       │   │
//! │  │  • Signing outgoing mail (authenticity)                         │   │
//! │  │  • Verifying senders' signatures                                │   │
//! │  │                                                                  │   │
//! │  │  Format:                                                        │   │
//! │  │  • Private key: 64 bytes on the wire (seed ‖ public key)       │   │
//! │  │  • Public key: 32 bytes (published in the key directory)       │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  UserKeys (Combined)                                            │   │
//! │  │  ───────────────────                                             │   │
//! │  │                                                                  │   │
//! │  │  Both keypairs together. This is what gets serialized,          │   │
//! │  │  encrypted under the wallet-derived key, and stored.            │   │
//! │  │                                                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The 64-byte signing-key wire form is deliberate: stored bundles carry the
//! seed and the public key together, so an unlocked bundle can be validated
//! without re-deriving anything.

use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::codec;
use crate::error::{Error, Result};

/// Size of all public keys in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of the X25519 private key in bytes
pub const ENCRYPTION_PRIVATE_KEY_SIZE: usize = 32;

/// Size of the Ed25519 private key wire form in bytes (seed ‖ public key)
pub const SIGNING_PRIVATE_KEY_SIZE: usize = 64;

/// X25519 encryption keypair for key exchange
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKeyPair {
    /// Private encryption key (secret)
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    /// Public encryption key (derived from secret)
    #[zeroize(skip)] // public material, nothing to erase
    public: X25519PublicKey,
}

impl EncryptionKeyPair {
    /// Generate a new random encryption keypair
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Restore from the 32-byte private key
    pub fn from_bytes(bytes: &[u8; ENCRYPTION_PRIVATE_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the secret key bytes (for the encrypted bundle only)
    ///
    /// ## Security Warning
    ///
    /// Only use this for secure storage. Never log or transmit these bytes.
    pub fn secret_bytes(&self) -> [u8; ENCRYPTION_PRIVATE_KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public.to_bytes()
    }

    /// Perform Diffie-Hellman key exchange
    ///
    /// Returns a shared secret that both parties can compute:
    /// - Sender: sender_secret × recipient_public
    /// - Recipient: recipient_secret × sender_public
    pub fn diffie_hellman(&self, their_public: &[u8; PUBLIC_KEY_SIZE]) -> [u8; 32] {
        let their_public = X25519PublicKey::from(*their_public);
        self.secret.diffie_hellman(&their_public).to_bytes()
    }
}

// Shows only the public half; the secret must never reach logs or
// panic messages.
impl fmt::Debug for EncryptionKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKeyPair")
            .field("public", &codec::encode_base64(&self.public_bytes()))
            .finish_non_exhaustive()
    }
}

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    /// Private signing key (secret)
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a new random signing keypair
    pub fn generate() -> Self {
        let secret = SigningKey::generate(&mut OsRng);
        Self { secret }
    }

    /// Restore from the 64-byte wire form (seed ‖ public key)
    ///
    /// Rejects bundles where the embedded public key does not match the seed.
    pub fn from_keypair_bytes(bytes: &[u8; SIGNING_PRIVATE_KEY_SIZE]) -> Result<Self> {
        let secret = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| Error::InvalidKey(format!("Invalid signing keypair: {}", e)))?;
        Ok(Self { secret })
    }

    /// Get the 64-byte wire form (for the encrypted bundle only)
    ///
    /// ## Security Warning
    ///
    /// Only use this for secure storage. Never log or transmit these bytes.
    pub fn to_keypair_bytes(&self) -> [u8; SIGNING_PRIVATE_KEY_SIZE] {
        self.secret.to_keypair_bytes()
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    /// Get reference to the signing key
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public", &codec::encode_base64(&self.public_bytes()))
            .finish_non_exhaustive()
    }
}

/// A user's complete key material
///
/// ## Security
///
/// - Private keys are zeroized when this struct is dropped
/// - Public keys can be safely shared with anyone
#[derive(ZeroizeOnDrop)]
pub struct UserKeys {
    /// X25519 keypair for encryption
    pub encryption: EncryptionKeyPair,
    /// Ed25519 keypair for signing
    pub signing: SigningKeyPair,
}

impl UserKeys {
    /// Generate a fresh, independent set of keypairs
    ///
    /// The two keypairs share no seed material. Keys are recoverable through
    /// the encrypted bundle, not through re-derivation, so independence costs
    /// nothing and keeps a signing-key compromise away from stored mail.
    pub fn generate() -> Self {
        Self {
            encryption: EncryptionKeyPair::generate(),
            signing: SigningKeyPair::generate(),
        }
    }

    /// Get the public halves for publication
    pub fn public_bundle(&self) -> PublicKeyBundle {
        PublicKeyBundle {
            encryption: self.encryption.public_bytes(),
            signing: self.signing.public_bytes(),
        }
    }
}

impl fmt::Debug for UserKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserKeys")
            .field("encryption", &self.encryption)
            .field("signing", &self.signing)
            .finish()
    }
}

/// Public keys that can be safely shared with others
///
/// This is the shape the key directory stores and other users fetch before
/// sending mail. Wire fields are base64, matching the rest of the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyBundle {
    /// X25519 public key for encryption (32 bytes)
    #[serde(rename = "encryptionPublicKey", with = "base64_key")]
    pub encryption: [u8; PUBLIC_KEY_SIZE],

    /// Ed25519 public key for signature verification (32 bytes)
    #[serde(rename = "signingPublicKey", with = "base64_key")]
    pub signing: [u8; PUBLIC_KEY_SIZE],
}

impl PublicKeyBundle {
    /// Create a bundle from raw bytes
    pub fn from_bytes(encryption: [u8; PUBLIC_KEY_SIZE], signing: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { encryption, signing }
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.signing)
            .map_err(|e| Error::InvalidKey(format!("Invalid signing public key: {}", e)))
    }

    /// Base64 form of the encryption public key (map key for wrapped session keys)
    pub fn encryption_base64(&self) -> String {
        codec::encode_base64(&self.encryption)
    }
}

/// Serde helper for serializing 32-byte keys as base64
mod base64_key {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::codec;

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::encode_base64(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        codec::decode_base64_array(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation_unique() {
        let k1 = UserKeys::generate();
        let k2 = UserKeys::generate();

        assert_ne!(k1.encryption.public_bytes(), k2.encryption.public_bytes());
        assert_ne!(k1.signing.public_bytes(), k2.signing.public_bytes());
    }

    #[test]
    fn test_keypairs_independent() {
        let keys = UserKeys::generate();

        // The X25519 and Ed25519 halves must not share material.
        assert_ne!(
            keys.encryption.secret_bytes().as_slice(),
            &keys.signing.to_keypair_bytes()[..32]
        );
    }

    #[test]
    fn test_encryption_keypair_round_trip() {
        let original = EncryptionKeyPair::generate();
        let restored = EncryptionKeyPair::from_bytes(&original.secret_bytes());

        assert_eq!(original.public_bytes(), restored.public_bytes());
    }

    #[test]
    fn test_signing_keypair_round_trip() {
        let original = SigningKeyPair::generate();
        let restored = SigningKeyPair::from_keypair_bytes(&original.to_keypair_bytes()).unwrap();

        assert_eq!(original.public_bytes(), restored.public_bytes());
    }

    #[test]
    fn test_signing_keypair_rejects_mismatched_half() {
        let a = SigningKeyPair::generate();
        let b = SigningKeyPair::generate();

        // Splice a's seed with b's public key.
        let mut spliced = a.to_keypair_bytes();
        spliced[32..].copy_from_slice(&b.to_keypair_bytes()[32..]);

        let result = SigningKeyPair::from_keypair_bytes(&spliced);
        assert!(matches!(result.unwrap_err(), Error::InvalidKey(_)));
    }

    #[test]
    fn test_diffie_hellman_agreement() {
        let sender = EncryptionKeyPair::generate();
        let recipient = EncryptionKeyPair::generate();

        let s1 = sender.diffie_hellman(&recipient.public_bytes());
        let s2 = recipient.diffie_hellman(&sender.public_bytes());

        assert_eq!(s1, s2);
    }

    #[test]
    fn test_debug_shows_public_halves_only() {
        let keys = UserKeys::generate();
        let dump = format!("{:?}", keys);

        assert!(dump.contains(&codec::encode_base64(&keys.encryption.public_bytes())));
        assert!(!dump.contains(&codec::encode_base64(&keys.encryption.secret_bytes())));
        assert!(!dump.contains(&codec::encode_base64(&keys.signing.to_keypair_bytes())));
    }

    #[test]
    fn test_public_bundle_wire_shape() {
        let keys = UserKeys::generate();
        let bundle = keys.public_bundle();

        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains("encryptionPublicKey"));
        assert!(json.contains("signingPublicKey"));

        let restored: PublicKeyBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(bundle, restored);
    }

    #[test]
    fn test_bundle_rejects_wrong_length_key() {
        let json = format!(
            r#"{{"encryptionPublicKey":"{}","signingPublicKey":"{}"}}"#,
            codec::encode_base64(&[0u8; 31]),
            codec::encode_base64(&[0u8; 32]),
        );
        assert!(serde_json::from_str::<PublicKeyBundle>(&json).is_err());
    }
}
