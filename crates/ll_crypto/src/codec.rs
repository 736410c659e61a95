//! Base64 helpers for binary salts and derived key material.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CryptoError;

/// Encode raw bytes as standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 back into raw bytes.
pub fn decode(b64: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(STANDARD.decode(b64)?)
}
