//! # Authentication Module
//!
//! Wallet-based authentication: challenge texts for wallets to sign, and an
//! SRP-style salt/verifier scheme so the server can check a login signature
//! without ever storing it.
//!
//! The crypto hierarchy (see [`crate::crypto`]) deliberately does not depend
//! on anything here at runtime; the link between the two is the wallet's
//! signature over [`challenge::key_derivation_challenge`], which callers feed
//! into [`crate::crypto::kdf::derive_master_key`].

pub mod challenge;
pub mod srp;

pub use challenge::{issue_login_challenge, key_derivation_challenge, LoginChallenge};
pub use srp::{generate_session_key, validate_session_key, SrpCredential};
