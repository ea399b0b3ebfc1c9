//! Wallet challenge texts and their validation rules.
//!
//! Two different challenges exist and must never be conflated:
//!
//! - The **login challenge** proves control of a wallet right now. It embeds
//!   a random nonce and an issue timestamp, and is only accepted inside a
//!   short validity window.
//! - The **key-derivation challenge** is deterministic per wallet address.
//!   Its signature feeds the KDF, so the text is byte-frozen: any change to
//!   wording, whitespace, or the version line would silently re-key every
//!   user and lock them out of their stored bundles.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codec;
use crate::error::{Error, Result};

/// How long a login challenge stays valid
pub const LOGIN_CHALLENGE_MAX_AGE_SECS: i64 = 300;

/// Tolerated clock skew for challenges timestamped slightly in the future
pub const CLOCK_SKEW_TOLERANCE_SECS: i64 = 30;

/// Size of the login-challenge nonce in bytes
pub const NONCE_BYTES: usize = 16;

/// A one-time login challenge for a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginChallenge {
    /// Full message text the wallet signs
    #[serde(rename = "challenge")]
    pub message: String,

    /// Random base64 nonce embedded in the message
    pub nonce: String,

    /// Issue time, on the wire as Unix milliseconds
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
}

impl LoginChallenge {
    /// Seconds elapsed since this challenge was issued (negative if the
    /// timestamp is in the future)
    pub fn age_seconds_at(&self, now: DateTime<Utc>) -> i64 {
        (now - self.issued_at).num_seconds()
    }

    /// Check the validity window against an explicit clock
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<()> {
        let age = self.age_seconds_at(now);
        if age > LOGIN_CHALLENGE_MAX_AGE_SECS || age < -CLOCK_SKEW_TOLERANCE_SECS {
            warn!(age_seconds = age, "login challenge outside validity window");
            return Err(Error::ChallengeExpired { age_seconds: age });
        }
        Ok(())
    }

    /// Check the validity window against the current time
    pub fn validate(&self) -> Result<()> {
        self.validate_at(Utc::now())
    }

    /// Time left before expiry, clamped to zero
    pub fn time_remaining_at(&self, now: DateTime<Utc>) -> Duration {
        let expires_at = self.issued_at + Duration::seconds(LOGIN_CHALLENGE_MAX_AGE_SECS);
        (expires_at - now).max(Duration::zero())
    }
}

/// Issue a fresh login challenge for a wallet address
pub fn issue_login_challenge(wallet_address: &str) -> LoginChallenge {
    let nonce = codec::encode_base64(&codec::random_bytes(NONCE_BYTES));
    let issued_at = Utc::now();

    let message = format!(
        "Sign this message to authenticate with VeilMail:\n\
         \n\
         Wallet: {}\n\
         Nonce: {}\n\
         Timestamp: {}\n\
         \n\
         This request will not trigger a blockchain transaction or cost any gas fees.",
        wallet_address,
        nonce,
        issued_at.timestamp_millis(),
    );

    LoginChallenge {
        message,
        nonce,
        issued_at,
    }
}

/// The deterministic key-derivation challenge for a wallet address
///
/// Byte-frozen. The signature over this exact text is the input to
/// [`derive_master_key`](crate::crypto::kdf::derive_master_key); changing a
/// single byte here changes every derived key.
pub fn key_derivation_challenge(wallet_address: &str) -> String {
    format!(
        "Sign this message to derive your encryption keys.\n\
         \n\
         Wallet: {}\n\
         Purpose: Key Derivation\n\
         Version: 1",
        wallet_address,
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_challenge_exact_text() {
        let text = key_derivation_challenge("0xAbC123");
        assert_eq!(
            text,
            "Sign this message to derive your encryption keys.\n\nWallet: 0xAbC123\nPurpose: Key Derivation\nVersion: 1"
        );
    }

    #[test]
    fn test_derivation_challenge_deterministic() {
        assert_eq!(
            key_derivation_challenge("0xabc"),
            key_derivation_challenge("0xabc")
        );
        assert_ne!(
            key_derivation_challenge("0xabc"),
            key_derivation_challenge("0xdef")
        );
    }

    #[test]
    fn test_login_challenge_contains_parts() {
        let challenge = issue_login_challenge("0xAbC123");

        assert!(challenge.message.contains("Wallet: 0xAbC123"));
        assert!(challenge.message.contains(&challenge.nonce));
        assert!(challenge
            .message
            .contains(&challenge.issued_at.timestamp_millis().to_string()));
    }

    #[test]
    fn test_login_nonces_unique() {
        let c1 = issue_login_challenge("0xabc");
        let c2 = issue_login_challenge("0xabc");
        assert_ne!(c1.nonce, c2.nonce);
    }

    #[test]
    fn test_fresh_challenge_validates() {
        let challenge = issue_login_challenge("0xabc");
        assert!(challenge.validate().is_ok());
    }

    #[test]
    fn test_expired_challenge_rejected() {
        let challenge = issue_login_challenge("0xabc");
        let later = challenge.issued_at + Duration::seconds(LOGIN_CHALLENGE_MAX_AGE_SECS + 1);

        let err = challenge.validate_at(later).unwrap_err();
        assert!(matches!(
            err,
            Error::ChallengeExpired { age_seconds } if age_seconds > LOGIN_CHALLENGE_MAX_AGE_SECS
        ));
    }

    #[test]
    fn test_boundary_age_accepted() {
        let challenge = issue_login_challenge("0xabc");
        let boundary = challenge.issued_at + Duration::seconds(LOGIN_CHALLENGE_MAX_AGE_SECS);
        assert!(challenge.validate_at(boundary).is_ok());
    }

    #[test]
    fn test_small_future_skew_tolerated() {
        let challenge = issue_login_challenge("0xabc");
        let slightly_before = challenge.issued_at - Duration::seconds(CLOCK_SKEW_TOLERANCE_SECS);
        assert!(challenge.validate_at(slightly_before).is_ok());
    }

    #[test]
    fn test_far_future_timestamp_rejected() {
        let challenge = issue_login_challenge("0xabc");
        let long_before =
            challenge.issued_at - Duration::seconds(CLOCK_SKEW_TOLERANCE_SECS + 60);

        let err = challenge.validate_at(long_before).unwrap_err();
        assert!(matches!(err, Error::ChallengeExpired { age_seconds } if age_seconds < 0));
    }

    #[test]
    fn test_time_remaining() {
        let challenge = issue_login_challenge("0xabc");

        let halfway = challenge.issued_at + Duration::seconds(LOGIN_CHALLENGE_MAX_AGE_SECS / 2);
        assert_eq!(
            challenge.time_remaining_at(halfway).num_seconds(),
            LOGIN_CHALLENGE_MAX_AGE_SECS / 2
        );

        let after = challenge.issued_at + Duration::seconds(LOGIN_CHALLENGE_MAX_AGE_SECS + 100);
        assert_eq!(challenge.time_remaining_at(after), Duration::zero());
    }

    #[test]
    fn test_wire_shape() {
        let challenge = issue_login_challenge("0xabc");
        let json = serde_json::to_string(&challenge).unwrap();

        assert!(json.contains("\"challenge\""));
        assert!(json.contains("\"nonce\""));
        assert!(json.contains("\"timestamp\""));

        let restored: LoginChallenge = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.nonce, challenge.nonce);
        assert_eq!(
            restored.issued_at.timestamp_millis(),
            challenge.issued_at.timestamp_millis()
        );
    }
}
