//! # Cryptography Module
//!
//! This module provides all cryptographic primitives used by VeilMail Core.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    KEY HIERARCHY                                │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Wallet Signature (over the deterministic derivation challenge)│   │
//! │  │                          │                                      │   │
//! │  │                          ▼                                      │   │
//! │  │  ┌─────────────────────────────────────────────────────────┐   │   │
//! │  │  │              Master Key (256 bits)                       │   │   │
//! │  │  │   Derived via Argon2id (t=3, m=4096 KiB, p=1)           │   │   │
//! │  │  └─────────────────────────────────────────────────────────┘   │   │
//! │  │                          │                                      │   │
//! │  │                          ▼  HKDF-SHA256 + domain label         │   │
//! │  │  ┌─────────────────────────────────────────────────────────┐   │   │
//! │  │  │         Bundle-Encryption Key (256 bits)                 │   │   │
//! │  │  │   Protects the stored private-key bundle:               │   │   │
//! │  │  └─────────────────────────────────────────────────────────┘   │   │
//! │  │                          │                                      │   │
//! │  │            ┌─────────────┴─────────────┐                       │   │
//! │  │            ▼                           ▼                       │   │
//! │  │  ┌─────────────────┐         ┌─────────────────┐              │   │
//! │  │  │ Encryption Key  │         │  Signing Key    │              │   │
//! │  │  │ (X25519)        │         │  (Ed25519)      │              │   │
//! │  │  │                 │         │                 │              │   │
//! │  │  │ • Key Exchange  │         │ • Mail          │              │   │
//! │  │  │ • Session-key   │         │   authenticity  │              │   │
//! │  │  │   unwrapping    │         │ • Verification  │              │   │
//! │  │  └─────────────────┘         └─────────────────┘              │   │
//! │  │                                                                 │   │
//! │  │  The keypairs are random, not derived: the hierarchy above     │   │
//! │  │  only decides what can DECRYPT the stored bundle.              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ENCRYPTION SCHEME                               │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  Mail Encryption (XChaCha20-Poly1305)                          │   │
//! │  │  ─────────────────────────────────────                          │   │
//! │  │                                                                 │   │
//! │  │  1. Session Key: 256 random bits per message                   │   │
//! │  │                                                                 │   │
//! │  │  2. Body: XChaCha20-Poly1305                                   │   │
//! │  │     • 256-bit key, 192-bit random nonce, 128-bit tag          │   │
//! │  │                                                                 │   │
//! │  │  3. Distribution: session key sealed per recipient             │   │
//! │  │     sender/recipient X25519 → HKDF-SHA256 → XChaCha20-Poly1305│   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | Argon2id | Signature → master key | Memory-hard, blunts bulk attacks |
//! | HKDF-SHA256 | Key Expansion | Industry standard, well-analyzed |
//! | X25519 | Key Exchange | Fast ECDH, widely audited |
//! | Ed25519 | Signing | Deterministic, small keys |
//! | XChaCha20-Poly1305 | Encryption | AEAD with collision-safe 192-bit nonces |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: All secret keys are zeroized when dropped
//! 2. **Constant-Time Operations**: Using dalek for constant-time crypto
//! 3. **Secure Random**: Using `rand::rngs::OsRng` for cryptographic randomness
//! 4. **No Key Reuse**: Unique nonces for every encryption operation

pub mod asymmetric;
pub mod kdf;
pub mod keys;
pub mod session;
pub mod signing;
pub mod symmetric;

pub use asymmetric::{open, seal};
pub use kdf::{derive_master_key, expand_key, generate_salt, validate_salt};
pub use keys::{EncryptionKeyPair, PublicKeyBundle, SigningKeyPair, UserKeys, PUBLIC_KEY_SIZE};
pub use session::{
    generate_session_key, unwrap_session_key, wrap_for_recipient, wrap_for_recipients, WrapReport,
};
pub use signing::{sign, verify, Signature, SIGNATURE_SIZE};
pub use symmetric::{decrypt, encrypt, EncryptedPayload, Nonce, SymmetricKey, KEY_SIZE, NONCE_SIZE};
