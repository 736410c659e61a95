//! Lesson progress: upsert-only records keyed by `(profile_id, lesson_id)`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::db::Store;
use crate::error::StoreError;
use crate::models::LessonProgress;

impl Store {
    /// All progress for a profile, folded into a lesson_id lookup.
    pub async fn progress_map(
        &self,
        profile_id: &str,
    ) -> Result<BTreeMap<String, LessonProgress>, StoreError> {
        let rows: Vec<(String, bool, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT lesson_id, completed, completed_at FROM progress WHERE profile_id = ?",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(lesson_id, completed, completed_at)| {
                (lesson_id, LessonProgress { completed, completed_at })
            })
            .collect())
    }

    /// Mark a lesson complete. Idempotent: the composite primary key makes
    /// repeated calls converge on a single row.
    pub async fn mark_complete(&self, profile_id: &str, lesson_id: &str) -> Result<(), StoreError> {
        self.upsert_progress(profile_id, lesson_id, true, Some(Utc::now())).await
    }

    /// Mark a lesson incomplete again (clears the completion timestamp).
    pub async fn mark_incomplete(
        &self,
        profile_id: &str,
        lesson_id: &str,
    ) -> Result<(), StoreError> {
        self.upsert_progress(profile_id, lesson_id, false, None).await
    }

    pub(crate) async fn upsert_progress(
        &self,
        profile_id: &str,
        lesson_id: &str,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO progress (profile_id, lesson_id, completed, completed_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(profile_id, lesson_id) DO UPDATE SET \
             completed = excluded.completed, completed_at = excluded.completed_at",
        )
        .bind(profile_id)
        .bind(lesson_id)
        .bind(completed)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
