//! PIN verification hashes.
//!
//! `generate_salt` — fresh random bytes, base64-encoded; stored next to the
//!   hash on the profile row (not secret).
//!
//! `derive_hash` — PBKDF2-HMAC-SHA256, deliberately slow so a stolen
//!   database file does not yield PINs by brute force in negligible time.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::codec;
use crate::error::CryptoError;

/// Salt length in raw bytes (pre-encoding).
pub const SALT_LEN: usize = 16;

/// PBKDF2 iteration count. Tuned for interactive unlock on low-end devices.
pub const ITERATIONS: u32 = 100_000;

/// Derived hash length in raw bytes (256-bit output).
pub const HASH_LEN: usize = 32;

/// Generate a fresh random salt, base64-encoded.
///
/// One salt per profile — never reuse across profiles, so identical PINs
/// still derive unrelated hashes.
pub fn generate_salt() -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::RandomUnavailable(e.to_string()))?;
    Ok(codec::encode(&salt))
}

/// Derive the verification hash for `pin` under `salt_b64`.
///
/// Deterministic: the same `(pin, salt)` always yields the same hash, which
/// is what makes stored-hash comparison work.
pub fn derive_hash(pin: &str, salt_b64: &str) -> Result<String, CryptoError> {
    let salt = codec::decode(salt_b64)?;
    let mut output = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), &salt, ITERATIONS, &mut output);
    Ok(codec::encode(&output))
}
