use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Secure random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}
