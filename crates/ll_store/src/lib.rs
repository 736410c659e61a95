//! ll_store — local multi-profile progress store for LessonLock
//!
//! Each learner on a device gets an isolated profile: lesson progress and
//! quiz attempt history live in per-profile rows of a local SQLite file,
//! optionally gated by a PIN (see `ll_crypto`). A versioned JSON snapshot
//! moves one profile's data between devices.
//!
//! # Collections
//! - `profiles`     — identity rows, keyed by `profile_id`; owns the PIN
//!                    credential columns and the cascading delete.
//! - `progress`     — lesson completion, upsert-only on the composite key
//!                    `(profile_id, lesson_id)`.
//! - `quiz_results` — append-only attempt log; best scores are derived at
//!                    read time, never persisted.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on first open.

pub mod db;
pub mod error;
pub mod models;
pub mod paths;
pub mod profiles;
pub mod progress;
pub mod quiz;
pub mod session;
pub mod snapshot;

pub use db::Store;
pub use error::StoreError;
pub use models::{LessonProgress, Profile, QuizResult};
pub use session::ActiveProfile;
pub use snapshot::Snapshot;
