//! # Digital Signatures Module
//!
//! Ed25519 detached signatures for mail authenticity. A sender signs the
//! plaintext before sealing it; recipients verify against the sender's
//! published signing key after opening.
//!
//! ## Security Properties
//!
//! | Property | Description |
//! |----------|-------------|
//! | Authenticity | Verifies the mail came from the claimed sender |
//! | Integrity | Detects any modification to the signed bytes |
//! | Determinism | Same key + same message always yields the same signature |
//! | Public Verification | Anyone with the public key can verify |

use ed25519_dalek::{Signature as Ed25519Signature, Signer, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{Error, Result};

use super::keys::SigningKeyPair;

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// An Ed25519 detached signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_bytes")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 64 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != SIGNATURE_SIZE {
            return Err(Error::InvalidKey(format!(
                "Signature must be {} bytes, got {}",
                SIGNATURE_SIZE,
                slice.len()
            )));
        }
        let mut bytes = [0u8; SIGNATURE_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    /// Encode as base64 for the wire
    pub fn to_base64(&self) -> String {
        codec::encode_base64(&self.0)
    }

    /// Decode from base64
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = codec::decode_base64(encoded)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Sign a message using Ed25519
///
/// ## Example
///
/// ```ignore
/// let keypair = SigningKeyPair::generate();
/// let signature = sign(&keypair, b"mail body bytes");
/// ```
pub fn sign(keypair: &SigningKeyPair, message: &[u8]) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature(sig.to_bytes())
}

/// Verify an Ed25519 signature against a 32-byte public key
///
/// Returns `Ok(())` if valid, `Err(VerificationFailed)` if invalid.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &Signature) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Error::InvalidKey(format!("Invalid public key: {}", e)))?;

    verify_with_key(&verifying_key, message, signature)
}

/// Verify a signature using a VerifyingKey directly
pub fn verify_with_key(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature: &Signature,
) -> Result<()> {
    let sig = Ed25519Signature::from_bytes(&signature.0);
    verifying_key
        .verify(message, &sig)
        .map_err(|_| Error::VerificationFailed)
}

/// Serde helper for signature bytes as base64
mod signature_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::codec;

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&codec::encode_base64(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<[u8; 64], D::Error>
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
    fn test_sign_verify() {
        let keypair = SigningKeyPair::generate();
        let message = b"Hello, VeilMail!";

        let signature = sign(&keypair, message);
        let result = verify(&keypair.public_bytes(), message, &signature);

        assert!(result.is_ok());
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let keypair = SigningKeyPair::generate();

        let signature = sign(&keypair, b"original");
        let result = verify(&keypair.public_bytes(), b"tampered", &signature);

        assert!(matches!(result.unwrap_err(), Error::VerificationFailed));
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let keypair1 = SigningKeyPair::generate();
        let keypair2 = SigningKeyPair::generate();
        let message = b"Hello, VeilMail!";

        let signature = sign(&keypair1, message);
        let result = verify(&keypair2.public_bytes(), message, &signature);

        assert!(matches!(result.unwrap_err(), Error::VerificationFailed));
    }

    #[test]
    fn test_deterministic_signatures() {
        let keypair = SigningKeyPair::generate();
        let message = b"Hello, VeilMail!";

        let sig1 = sign(&keypair, message);
        let sig2 = sign(&keypair, message);

        // Ed25519 is deterministic
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_base64_round_trip() {
        let keypair = SigningKeyPair::generate();
        let signature = sign(&keypair, b"test");

        let encoded = signature.to_base64();
        let restored = Signature::from_base64(&encoded).unwrap();

        assert_eq!(signature, restored);
    }

    #[test]
    fn test_signature_wrong_length_rejected() {
        let result = Signature::from_slice(&[0u8; 63]);
        assert!(matches!(result.unwrap_err(), Error::InvalidKey(_)));
    }

    #[test]
    fn test_signature_serialization() {
        let keypair = SigningKeyPair::generate();
        let signature = sign(&keypair, b"test");

        let json = serde_json::to_string(&signature).unwrap();
        let restored: Signature = serde_json::from_str(&json).unwrap();

        assert_eq!(signature, restored);
    }
}
