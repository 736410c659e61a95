//! Database row models — these map to/from SQL rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub profile_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Base64 random salt — null together with `pin_hash`.
    pub pin_salt: Option<String>,
    /// Base64 PBKDF2 verification hash — null together with `pin_salt`.
    pub pin_hash: Option<String>,
}

impl Profile {
    pub fn has_pin(&self) -> bool {
        self.pin_hash.is_some()
    }
}

/// Per-lesson completion state, keyed externally by `(profile_id, lesson_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One quiz attempt. Rows are append-only; `percentage` is computed at
/// submission time and `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: i64,
    pub profile_id: String,
    pub quiz_id: String,
    pub score: i64,
    pub total_questions: i64,
    /// Question index -> selected option index.
    pub answers: BTreeMap<u32, u32>,
    pub completed_at: DateTime<Utc>,
    pub percentage: i64,
}

/// Raw quiz row with `answers` still in its JSON TEXT column form.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct QuizResultRow {
    pub id: i64,
    pub profile_id: String,
    pub quiz_id: String,
    pub score: i64,
    pub total_questions: i64,
    pub answers: String,
    pub completed_at: DateTime<Utc>,
    pub percentage: i64,
}

impl TryFrom<QuizResultRow> for QuizResult {
    type Error = serde_json::Error;

    fn try_from(row: QuizResultRow) -> Result<Self, Self::Error> {
        Ok(QuizResult {
            id: row.id,
            profile_id: row.profile_id,
            quiz_id: row.quiz_id,
            score: row.score,
            total_questions: row.total_questions,
            answers: serde_json::from_str(&row.answers)?,
            completed_at: row.completed_at,
            percentage: row.percentage,
        })
    }
}
