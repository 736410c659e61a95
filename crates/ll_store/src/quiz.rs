//! Quiz attempt log: append-only rows plus a derived best-score view.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::db::Store;
use crate::error::StoreError;
use crate::models::{QuizResult, QuizResultRow};

/// Percentage on a 0..=100 scale, rounded half away from zero.
pub(crate) fn percentage(score: i64, total_questions: i64) -> i64 {
    ((100 * score) as f64 / total_questions as f64).round() as i64
}

impl Store {
    /// Record a quiz attempt. Every submission appends a new row, including
    /// resubmission of the same quiz — history is never overwritten.
    pub async fn submit_quiz(
        &self,
        profile_id: &str,
        quiz_id: &str,
        score: i64,
        total_questions: i64,
        answers: &BTreeMap<u32, u32>,
    ) -> Result<QuizResult, StoreError> {
        if total_questions <= 0 {
            return Err(StoreError::Validation(
                "totalQuestions must be positive".into(),
            ));
        }
        if score < 0 {
            return Err(StoreError::Validation("score must not be negative".into()));
        }

        let completed_at = Utc::now();
        let percentage = percentage(score, total_questions);
        let answers_json = serde_json::to_string(answers)?;

        let result = sqlx::query(
            "INSERT INTO quiz_results \
             (profile_id, quiz_id, score, total_questions, answers, completed_at, percentage) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(profile_id)
        .bind(quiz_id)
        .bind(score)
        .bind(total_questions)
        .bind(&answers_json)
        .bind(completed_at)
        .bind(percentage)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%profile_id, %quiz_id, percentage, "recorded quiz attempt");
        Ok(QuizResult {
            id: result.last_insert_rowid(),
            profile_id: profile_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score,
            total_questions,
            answers: answers.clone(),
            completed_at,
            percentage,
        })
    }

    /// Best attempt per quiz for a profile.
    ///
    /// Attempts are scanned in `completed_at` ascending order and an
    /// equal-or-higher percentage replaces the current best, so on an exact
    /// percentage tie the latest attempt wins deterministically.
    pub async fn best_scores(
        &self,
        profile_id: &str,
    ) -> Result<BTreeMap<String, QuizResult>, StoreError> {
        let rows = sqlx::query_as::<_, QuizResultRow>(
            "SELECT id, profile_id, quiz_id, score, total_questions, answers, \
                    completed_at, percentage \
             FROM quiz_results WHERE profile_id = ? ORDER BY completed_at ASC, id ASC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        let mut best: BTreeMap<String, QuizResult> = BTreeMap::new();
        for row in rows {
            let result = QuizResult::try_from(row)?;
            match best.get(&result.quiz_id) {
                Some(current) if result.percentage < current.percentage => {}
                _ => {
                    best.insert(result.quiz_id.clone(), result);
                }
            }
        }
        Ok(best)
    }

    /// Full attempt history for a profile, newest first.
    pub async fn all_results(&self, profile_id: &str) -> Result<Vec<QuizResult>, StoreError> {
        let rows = sqlx::query_as::<_, QuizResultRow>(
            "SELECT id, profile_id, quiz_id, score, total_questions, answers, \
                    completed_at, percentage \
             FROM quiz_results WHERE profile_id = ? ORDER BY completed_at DESC, id DESC",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| QuizResult::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Attempt history for one quiz, newest first.
    pub async fn results_for_quiz(
        &self,
        profile_id: &str,
        quiz_id: &str,
    ) -> Result<Vec<QuizResult>, StoreError> {
        let rows = sqlx::query_as::<_, QuizResultRow>(
            "SELECT id, profile_id, quiz_id, score, total_questions, answers, \
                    completed_at, percentage \
             FROM quiz_results WHERE profile_id = ? AND quiz_id = ? \
             ORDER BY completed_at DESC, id DESC",
        )
        .bind(profile_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| QuizResult::try_from(row).map_err(StoreError::from))
            .collect()
    }
}
