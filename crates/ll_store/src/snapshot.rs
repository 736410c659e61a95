//! Versioned JSON snapshot: moves one profile's data between devices.
//!
//! PIN credentials never leave the device — the snapshot carries profile
//! identity, progress, and quiz history only. Import accepts version 1
//! exclusively.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Store;
use crate::error::StoreError;
use crate::models::QuizResultRow;
use crate::quiz;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub profile: SnapshotProfile,
    #[serde(default)]
    pub progress: Vec<SnapshotProgress>,
    #[serde(default)]
    pub quiz_results: Vec<SnapshotQuizResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotProfile {
    pub profile_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotProgress {
    pub lesson_id: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuizResult {
    pub quiz_id: String,
    pub score: i64,
    pub total_questions: i64,
    #[serde(default)]
    pub answers: BTreeMap<u32, u32>,
    pub completed_at: DateTime<Utc>,
    /// Omitted on export; recomputed from score/totalQuestions on import
    /// when a foreign snapshot leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
}

impl Store {
    /// Assemble a version-1 snapshot of one profile.
    pub async fn export_profile(&self, profile_id: &str) -> Result<Snapshot, StoreError> {
        let profile = self.get_profile(profile_id).await?;

        let progress_rows: Vec<(String, bool, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT lesson_id, completed, completed_at FROM progress \
             WHERE profile_id = ? ORDER BY lesson_id ASC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        let quiz_rows = sqlx::query_as::<_, QuizResultRow>(
            "SELECT id, profile_id, quiz_id, score, total_questions, answers, \
                    completed_at, percentage \
             FROM quiz_results WHERE profile_id = ? ORDER BY completed_at ASC, id ASC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        let mut quiz_results = Vec::with_capacity(quiz_rows.len());
        for row in quiz_rows {
            quiz_results.push(SnapshotQuizResult {
                quiz_id: row.quiz_id,
                score: row.score,
                total_questions: row.total_questions,
                answers: serde_json::from_str(&row.answers)?,
                completed_at: row.completed_at,
                percentage: None,
            });
        }

        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            profile: SnapshotProfile {
                profile_id: profile.profile_id,
                name: profile.name,
                created_at: profile.created_at,
                updated_at: profile.updated_at,
            },
            progress: progress_rows
                .into_iter()
                .map(|(lesson_id, completed, completed_at)| SnapshotProgress {
                    lesson_id,
                    completed,
                    completed_at,
                })
                .collect(),
            quiz_results,
        })
    }

    /// Import a snapshot, either into a brand-new PIN-less profile or over
    /// an existing one (`overwrite_profile_id`), whose PIN stays untouched.
    ///
    /// One transaction covers the whole write batch: progress entries are
    /// upserted by `(profile_id, lesson_id)` so re-importing does not
    /// duplicate them, while quiz rows are appended without deduplication —
    /// importing the same snapshot twice doubles quiz history.
    ///
    /// Returns the id of the profile the data landed in.
    pub async fn import_snapshot(
        &self,
        snapshot: &Snapshot,
        overwrite_profile_id: Option<&str>,
    ) -> Result<String, StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let name = snapshot.profile.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "snapshot profile name is missing".into(),
            ));
        }
        for entry in &snapshot.quiz_results {
            if entry.total_questions <= 0 {
                return Err(StoreError::Validation(format!(
                    "snapshot quiz {} has non-positive totalQuestions",
                    entry.quiz_id
                )));
            }
            if entry.score < 0 {
                return Err(StoreError::Validation(format!(
                    "snapshot quiz {} has a negative score",
                    entry.quiz_id
                )));
            }
        }

        // Resolve the target before mutating anything.
        let now = Utc::now();
        let (profile_id, is_new) = match overwrite_profile_id {
            Some(id) => {
                self.get_profile(id).await?;
                (id.to_string(), false)
            }
            None => (Uuid::new_v4().to_string(), true),
        };

        let mut tx = self.pool.begin().await?;

        if is_new {
            sqlx::query(
                "INSERT INTO profiles (profile_id, name, created_at, updated_at, pin_salt, pin_hash) \
                 VALUES (?, ?, ?, ?, NULL, NULL)",
            )
            .bind(&profile_id)
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query("UPDATE profiles SET name = ?, updated_at = ? WHERE profile_id = ?")
                .bind(name)
                .bind(now)
                .bind(&profile_id)
                .execute(&mut *tx)
                .await?;
        }

        for entry in &snapshot.progress {
            sqlx::query(
                "INSERT INTO progress (profile_id, lesson_id, completed, completed_at) \
                 VALUES (?, ?, ?, ?) \
                 ON CONFLICT(profile_id, lesson_id) DO UPDATE SET \
                 completed = excluded.completed, completed_at = excluded.completed_at",
            )
            .bind(&profile_id)
            .bind(&entry.lesson_id)
            .bind(entry.completed)
            .bind(entry.completed_at)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &snapshot.quiz_results {
            let percentage = entry
                .percentage
                .unwrap_or_else(|| quiz::percentage(entry.score, entry.total_questions));
            sqlx::query(
                "INSERT INTO quiz_results \
                 (profile_id, quiz_id, score, total_questions, answers, completed_at, percentage) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&profile_id)
            .bind(&entry.quiz_id)
            .bind(entry.score)
            .bind(entry.total_questions)
            .bind(serde_json::to_string(&entry.answers)?)
            .bind(entry.completed_at)
            .bind(percentage)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(
            %profile_id,
            new = is_new,
            progress = snapshot.progress.len(),
            quizzes = snapshot.quiz_results.len(),
            "imported snapshot"
        );
        Ok(profile_id)
    }
}
