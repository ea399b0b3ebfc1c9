//! # VeilMail Core
//!
//! Wallet-derived key management and multi-recipient encryption for an
//! end-to-end encrypted mail client. The wallet is the only credential:
//! signing a deterministic challenge re-derives the keys that unlock
//! everything else, so there is no password and nothing secret stored
//! server-side.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       VEILMAIL CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────────────┐ │
//! │  │   Account   │  │   Mailbox   │  │             Auth                │ │
//! │  │             │  │             │  │                                 │ │
//! │  │ - Provision │  │ - Seal      │  │ - Login challenge (nonce+time)  │ │
//! │  │ - Unlock    │  │ - Open      │  │ - Derivation challenge (fixed)  │ │
//! │  │ - Rotate    │  │ - Quota size│  │ - SRP-style salt/verifier       │ │
//! │  └──────┬──────┘  └──────┬──────┘  └───────────────┬─────────────────┘ │
//! │         │                │                         │                   │
//! │         └────────────────┴─────────────────────────┘                   │
//! │                                   │                                     │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │                            Crypto                                 │ │
//! │  │                                                                   │ │
//! │  │  kdf        Argon2id + HKDF-SHA256 (signature → keys)            │ │
//! │  │  keys       X25519 + Ed25519 keypairs, public-key bundle         │ │
//! │  │  symmetric  XChaCha20-Poly1305, context-bound payloads           │ │
//! │  │  asymmetric sender-authenticated X25519 boxes                    │ │
//! │  │  session    per-message keys, multi-recipient wrapping           │ │
//! │  │  signing    Ed25519 detached signatures                          │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                                                                         │
//! │  codec: base64 + CSPRNG        error: categorized codes for the API    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`codec`] - Base64 wire encoding and secure randomness
//! - [`crypto`] - Cryptographic primitives (KDF, keys, AEAD, signing, sessions)
//! - [`auth`] - Wallet challenges and SRP-style credential verification
//! - [`account`] - Encrypted private-key bundle lifecycle
//! - [`mailbox`] - Sealing and opening multi-recipient mail
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Wallet-Derived Key Protection (Argon2id + HKDF)              │
//! │  ──────────────────────────────────────────────────────────             │
//! │  The private-key bundle is encrypted under a key derived from the      │
//! │  wallet's signature over a frozen challenge. The server stores only    │
//! │  ciphertext and salts; without the wallet, the bundle is opaque.       │
//! │                                                                         │
//! │  Layer 2: Message-Level E2E Encryption (session keys)                  │
//! │  ─────────────────────────────────────────────────────                  │
//! │  Every mail body is encrypted once under a random session key,         │
//! │  which is sealed per recipient with X25519 + XChaCha20-Poly1305.       │
//! │                                                                         │
//! │  Layer 3: Mail Authentication (Ed25519 Signatures)                     │
//! │  ──────────────────────────────────────────────────                     │
//! │  Every mail is signed by the sender over the plaintext, preventing     │
//! │  forgery once the body is opened.                                      │
//! │                                                                         │
//! │  Layer 4: Login Without Stored Secrets (SRP-style verifier)            │
//! │  ──────────────────────────────────────────────────────────             │
//! │  The server verifies login signatures against a salted Argon2id        │
//! │  verifier; a database leak yields nothing replayable.                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate holds no global state. Callers construct what they need and
//! own every key's lifetime; secrets zeroize on drop.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod account;
pub mod auth;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod mailbox;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use account::{EncryptedKeysRecord, ProvisionedKeys, SetupKeysRequest};
pub use auth::{LoginChallenge, SrpCredential};
pub use crypto::{EncryptedPayload, PublicKeyBundle, SymmetricKey, UserKeys};
pub use error::{Error, Result};
pub use mailbox::SealedEmail;
