use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unsupported snapshot version: {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] ll_crypto::CryptoError),

    #[error("Cannot determine data directory: {0}")]
    DataDir(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
