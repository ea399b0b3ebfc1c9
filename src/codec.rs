//! Byte-level codecs shared by every other module.
//!
//! Everything that crosses the API boundary travels as base64 text; this
//! module is the single place that encoding/decoding happens so that the
//! wire alphabet (standard, padded) can never drift between call sites.
//! It also owns secure random byte generation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Error, Result};

/// Encode bytes as standard padded base64
pub fn encode_base64(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode standard padded base64 into bytes
///
/// Failure is a malformed-input error, never an authentication error.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(data)
        .map_err(|e| Error::InvalidPayload(format!("invalid base64: {}", e)))
}

/// Decode base64 into a fixed-size array
///
/// Used for key and nonce material where the length is part of the contract.
pub fn decode_base64_array<const N: usize>(data: &str) -> Result<[u8; N]> {
    let bytes = decode_base64(data)?;
    bytes.as_slice().try_into().map_err(|_| {
        Error::InvalidPayload(format!("expected {} bytes, got {}", N, bytes.len()))
    })
}

/// Fill a buffer of `len` bytes from the operating system CSPRNG
///
/// Panics if the OS randomness source is unavailable. There is no sane way
/// to continue generating key material without it.
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a fixed-size array of random bytes
pub fn random_array<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

// ============================================================================
// TESTS
// ============================================================================
