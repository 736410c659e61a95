//! ll_crypto — LessonLock PIN credential derivation
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - The PIN is a local deterrent, not a security boundary: derivation is
//!   slow and salted so hashes cannot be reused across profiles, but there
//!   is no account recovery and no server-side verification.
//!
//! # Module layout
//! - `codec` — base64 encode/decode helpers for salts and derived hashes
//! - `pin`   — salt generation + PBKDF2-HMAC-SHA256 verification hashes
//! - `error` — unified error type

pub mod codec;
pub mod error;
pub mod pin;

pub use error::CryptoError;
