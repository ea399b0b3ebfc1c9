//! # Account Key Lifecycle
//!
//! Provisioning, unlocking, and rotating a user's encrypted private-key
//! bundle. This is the module that ties the wallet signature to the key
//! material:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PROVISION / UNLOCK FLOW                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  PROVISION (first login)                                                │
//! │  ───────────────────────                                                │
//! │  1. wallet signs the deterministic derivation challenge                 │
//! │  2. master_salt     = 16 random bytes                                   │
//! │  3. master_key      = Argon2id(signature, master_salt)                  │
//! │  4. bundle_key_salt = 16 random bytes                                   │
//! │  5. bundle_key      = HKDF(master_key, bundle_key_salt, PRIVATE_KEYS)   │
//! │  6. generate fresh X25519 + Ed25519 keypairs                            │
//! │  7. bundle          = JSON { encryptionPrivateKey, signingPrivateKey }  │
//! │  8. store encrypt(bundle, bundle_key, "UserPrivateKeys") + both salts   │
//! │     + both public keys                                                  │
//! │                                                                         │
//! │  UNLOCK (every later login)                                             │
//! │  ──────────────────────────                                             │
//! │  1. wallet signs the same challenge → same signature                    │
//! │  2. re-derive master_key and bundle_key from the stored salts           │
//! │  3. decrypt the bundle, reconstruct both keypairs                       │
//! │                                                                         │
//! │  Nothing secret is ever stored: the server holds only salts,           │
//! │  ciphertext, and public keys.                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec;
use crate::crypto::keys::{
    EncryptionKeyPair, PublicKeyBundle, SigningKeyPair, UserKeys, ENCRYPTION_PRIVATE_KEY_SIZE,
    SIGNING_PRIVATE_KEY_SIZE,
};
use crate::crypto::symmetric::{self, EncryptedPayload, Nonce, SymmetricKey, NONCE_SIZE};
use crate::crypto::kdf;
use crate::error::{Error, Result};

/// Context label binding bundle ciphertexts to their purpose
pub const BUNDLE_CONTEXT: &str = "UserPrivateKeys";

/// The serialized private-key bundle, before encryption
///
/// Never leaves this module unencrypted. Both fields are base64.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct PrivateKeyBundle {
    /// X25519 private key (32 bytes, base64)
    #[serde(rename = "encryptionPrivateKey")]
    encryption_private_key: String,

    /// Ed25519 private key wire form (64 bytes: seed ‖ public, base64)
    #[serde(rename = "signingPrivateKey")]
    signing_private_key: String,
}

/// What the client sends the server after provisioning
///
/// Everything here is safe to store: ciphertext, salts, nonce, public keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupKeysRequest {
    /// Encrypted private-key bundle (base64 ciphertext)
    #[serde(rename = "encryptedPrivateKeys")]
    pub encrypted_private_keys: String,

    /// Nonce the bundle was sealed under (base64, 24 bytes)
    #[serde(rename = "encryptionNonce")]
    pub encryption_nonce: String,

    /// Salt for Argon2id master-key derivation (base64)
    #[serde(rename = "masterKeySalt")]
    pub master_key_salt: String,

    /// Salt for HKDF expansion of the bundle key (base64)
    #[serde(rename = "encryptionKeySalt")]
    pub encryption_key_salt: String,

    /// X25519 public key (base64, 32 bytes)
    #[serde(rename = "encryptionPublicKey")]
    pub encryption_public_key: String,

    /// Ed25519 public key (base64, 32 bytes)
    #[serde(rename = "signingPublicKey")]
    pub signing_public_key: String,
}

impl SetupKeysRequest {
    /// The stored-record view of this request
    pub fn to_record(&self) -> EncryptedKeysRecord {
        EncryptedKeysRecord {
            encrypted_private_keys: self.encrypted_private_keys.clone(),
            encryption_nonce: self.encryption_nonce.clone(),
            master_key_salt: self.master_key_salt.clone(),
            encryption_key_salt: self.encryption_key_salt.clone(),
        }
    }
}

/// The subset of [`SetupKeysRequest`] needed to unlock the bundle later
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKeysRecord {
    /// Encrypted private-key bundle (base64 ciphertext)
    #[serde(rename = "encryptedPrivateKeys")]
    pub encrypted_private_keys: String,

    /// Nonce the bundle was sealed under (base64, 24 bytes)
    #[serde(rename = "encryptionNonce")]
    pub encryption_nonce: String,

    /// Salt for Argon2id master-key derivation (base64)
    #[serde(rename = "masterKeySalt")]
    pub master_key_salt: String,

    /// Salt for HKDF expansion of the bundle key (base64)
    #[serde(rename = "encryptionKeySalt")]
    pub encryption_key_salt: String,
}

/// Freshly provisioned keys plus the request that persists them
pub struct ProvisionedKeys {
    /// The in-memory keypairs, ready for immediate use
    pub keys: UserKeys,
    /// What to send to the server
    pub request: SetupKeysRequest,
}

/// Guard for first-time setup: fails if a record already exists
pub fn ensure_not_provisioned(existing: Option<&EncryptedKeysRecord>) -> Result<()> {
    match existing {
        Some(_) => Err(Error::SetupConflict),
        None => Ok(()),
    }
}

/// Guard for unlock: fails if no record exists yet
pub fn require_record(record: Option<&EncryptedKeysRecord>) -> Result<&EncryptedKeysRecord> {
    record.ok_or(Error::KeysNotFound)
}

/// Provision fresh keypairs for a wallet
///
/// `derivation_signature` is the wallet's signature over
/// [`key_derivation_challenge`](crate::auth::challenge::key_derivation_challenge).
pub fn provision_user_keys(derivation_signature: &str) -> Result<ProvisionedKeys> {
    let keys = UserKeys::generate();

    let master_salt = kdf::generate_salt();
    let bundle_key_salt = kdf::generate_salt();
    let request = seal_bundle(&keys, derivation_signature, &master_salt, &bundle_key_salt)?;

    info!("provisioned new user keypairs");
    Ok(ProvisionedKeys { keys, request })
}

/// Unlock stored keys with a wallet signature
///
/// ## Errors
///
/// - `InvalidSalt` / `InvalidPayload` if the stored record is damaged
/// - `AuthenticationFailed` if the signature does not reproduce the bundle
///   key (wrong wallet, or a wallet whose signatures are not deterministic)
pub fn unlock_user_keys(derivation_signature: &str, record: &EncryptedKeysRecord) -> Result<UserKeys> {
    let bundle_key = derive_bundle_key(
        derivation_signature,
        &codec::decode_base64(&record.master_key_salt)?,
        &codec::decode_base64(&record.encryption_key_salt)?,
    )?;

    let payload = EncryptedPayload {
        ciphertext: codec::decode_base64(&record.encrypted_private_keys)?,
        nonce: Nonce::from_bytes(codec::decode_base64_array::<NONCE_SIZE>(
            &record.encryption_nonce,
        )?),
    };

    let mut bundle_json = symmetric::decrypt(&payload, &bundle_key, Some(BUNDLE_CONTEXT))?;
    let bundle: PrivateKeyBundle = serde_json::from_slice(&bundle_json)
        .map_err(|e| Error::InvalidPayload(format!("malformed key bundle: {}", e)))?;
    bundle_json.zeroize();

    let encryption_private: [u8; ENCRYPTION_PRIVATE_KEY_SIZE] =
        codec::decode_base64_array(&bundle.encryption_private_key)?;
    let signing_private: [u8; SIGNING_PRIVATE_KEY_SIZE] =
        codec::decode_base64_array(&bundle.signing_private_key)?;

    Ok(UserKeys {
        encryption: EncryptionKeyPair::from_bytes(&encryption_private),
        signing: SigningKeyPair::from_keypair_bytes(&signing_private)?,
    })
}

/// Re-encrypt existing keys under a new wallet signature
///
/// Used when the derivation signature changes (wallet migration). The
/// keypairs themselves survive, so old mail stays readable; only the salts
/// and the bundle ciphertext are replaced.
pub fn reencrypt_user_keys(
    old_signature: &str,
    new_signature: &str,
    record: &EncryptedKeysRecord,
) -> Result<ProvisionedKeys> {
    let keys = unlock_user_keys(old_signature, record)?;

    let master_salt = kdf::generate_salt();
    let bundle_key_salt = kdf::generate_salt();
    let request = seal_bundle(&keys, new_signature, &master_salt, &bundle_key_salt)?;

    info!("re-encrypted user key bundle under new signature");
    Ok(ProvisionedKeys { keys, request })
}

/// Serialize and encrypt the bundle, producing the full setup request
fn seal_bundle(
    keys: &UserKeys,
    signature: &str,
    master_salt: &[u8],
    bundle_key_salt: &[u8],
) -> Result<SetupKeysRequest> {
    let bundle_key = derive_bundle_key(signature, master_salt, bundle_key_salt)?;

    let bundle = PrivateKeyBundle {
        encryption_private_key: codec::encode_base64(&keys.encryption.secret_bytes()),
        signing_private_key: codec::encode_base64(&keys.signing.to_keypair_bytes()),
    };
    let mut bundle_json = serde_json::to_vec(&bundle)?;

    let payload = symmetric::encrypt(&bundle_json, &bundle_key, Some(BUNDLE_CONTEXT));
    bundle_json.zeroize();
    let payload = payload?;

    let PublicKeyBundle { encryption, signing } = keys.public_bundle();

    Ok(SetupKeysRequest {
        encrypted_private_keys: codec::encode_base64(&payload.ciphertext),
        encryption_nonce: codec::encode_base64(payload.nonce.as_bytes()),
        master_key_salt: codec::encode_base64(master_salt),
        encryption_key_salt: codec::encode_base64(bundle_key_salt),
        encryption_public_key: codec::encode_base64(&encryption),
        signing_public_key: codec::encode_base64(&signing),
    })
}

/// Signature + stored salts → the key that encrypts the bundle
fn derive_bundle_key(
    signature: &str,
    master_salt: &[u8],
    bundle_key_salt: &[u8],
) -> Result<SymmetricKey> {
    let master = kdf::derive_master_key(signature, master_salt)?;
    kdf::expand_key(&master, bundle_key_salt, kdf::domain::PRIVATE_KEYS)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE: &str = "0xaabbccddeeff00112233445566778899";

    #[test]
    fn test_provision_unlock_round_trip() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();
        let record = provisioned.request.to_record();

        let unlocked = unlock_user_keys(SIGNATURE, &record).unwrap();

        assert_eq!(
            unlocked.encryption.public_bytes(),
            provisioned.keys.encryption.public_bytes()
        );
        assert_eq!(
            unlocked.signing.public_bytes(),
            provisioned.keys.signing.public_bytes()
        );
    }

    #[test]
    fn test_wrong_signature_cannot_unlock() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();
        let record = provisioned.request.to_record();

        let result = unlock_user_keys("0xwrongsignature", &record);
        assert!(matches!(result.unwrap_err(), Error::AuthenticationFailed));
    }

    #[test]
    fn test_request_publishes_matching_public_keys() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();

        assert_eq!(
            provisioned.request.encryption_public_key,
            codec::encode_base64(&provisioned.keys.encryption.public_bytes())
        );
        assert_eq!(
            provisioned.request.signing_public_key,
            codec::encode_base64(&provisioned.keys.signing.public_bytes())
        );
    }

    #[test]
    fn test_provisioning_is_randomized() {
        let p1 = provision_user_keys(SIGNATURE).unwrap();
        let p2 = provision_user_keys(SIGNATURE).unwrap();

        // Same signature, but fresh keys and salts every time.
        assert_ne!(
            p1.request.encryption_public_key,
            p2.request.encryption_public_key
        );
        assert_ne!(p1.request.master_key_salt, p2.request.master_key_salt);
    }

    #[test]
    fn test_tampered_record_fails_closed() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();
        let mut record = provisioned.request.to_record();

        let mut ciphertext = codec::decode_base64(&record.encrypted_private_keys).unwrap();
        ciphertext[0] ^= 0x01;
        record.encrypted_private_keys = codec::encode_base64(&ciphertext);

        let result = unlock_user_keys(SIGNATURE, &record);
        assert!(matches!(result.unwrap_err(), Error::AuthenticationFailed));
    }

    #[test]
    fn test_reencrypt_preserves_keypairs() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();
        let record = provisioned.request.to_record();

        let new_signature = "0xnewwalletsignature";
        let rotated = reencrypt_user_keys(SIGNATURE, new_signature, &record).unwrap();

        // Same keypairs, new wrapping.
        assert_eq!(
            rotated.keys.encryption.public_bytes(),
            provisioned.keys.encryption.public_bytes()
        );
        assert_ne!(
            rotated.request.master_key_salt,
            provisioned.request.master_key_salt
        );

        // Old signature no longer unlocks the new record.
        let new_record = rotated.request.to_record();
        assert!(unlock_user_keys(SIGNATURE, &new_record).is_err());
        let unlocked = unlock_user_keys(new_signature, &new_record).unwrap();
        assert_eq!(
            unlocked.signing.public_bytes(),
            provisioned.keys.signing.public_bytes()
        );
    }

    #[test]
    fn test_setup_guards() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();
        let record = provisioned.request.to_record();

        assert!(ensure_not_provisioned(None).is_ok());
        assert!(matches!(
            ensure_not_provisioned(Some(&record)).unwrap_err(),
            Error::SetupConflict
        ));

        assert!(require_record(Some(&record)).is_ok());
        assert!(matches!(
            require_record(None).unwrap_err(),
            Error::KeysNotFound
        ));
    }

    #[test]
    fn test_wire_field_names() {
        let provisioned = provision_user_keys(SIGNATURE).unwrap();
        let json = serde_json::to_string(&provisioned.request).unwrap();

        for field in [
            "encryptedPrivateKeys",
            "encryptionNonce",
            "masterKeySalt",
            "encryptionKeySalt",
            "encryptionPublicKey",
            "signingPublicKey",
        ] {
            assert!(json.contains(field), "missing field {}", field);
        }
    }
}
