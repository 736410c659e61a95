//! Profile CRUD, PIN management, and the cascading delete.
//!
//! This module is the only place allowed to create or destroy profile
//! identity. `progress` and `quiz_results` rows reference `profile_id`
//! without a real foreign key, so deletion sweeps both collections inside
//! one transaction.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Store;
use crate::error::StoreError;
use crate::models::Profile;

/// Minimum PIN length accepted for persistence. The UI validates first for
/// its own message; the store refuses regardless.
pub const MIN_PIN_LEN: usize = 4;

fn validate_name(name: &str) -> Result<&str, StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(
            "profile name must not be empty".into(),
        ));
    }
    Ok(trimmed)
}

fn validate_pin(pin: &str) -> Result<(), StoreError> {
    if pin.chars().count() < MIN_PIN_LEN {
        return Err(StoreError::Validation(format!(
            "PIN must be at least {MIN_PIN_LEN} characters"
        )));
    }
    Ok(())
}

impl Store {
    /// Create a profile. A supplied PIN gets a fresh salt + derived hash;
    /// without one, both credential columns stay null.
    pub async fn create_profile(
        &self,
        name: &str,
        pin: Option<&str>,
    ) -> Result<Profile, StoreError> {
        let name = validate_name(name)?;

        let (pin_salt, pin_hash) = match pin {
            Some(pin) => {
                validate_pin(pin)?;
                let salt = ll_crypto::pin::generate_salt()?;
                let hash = ll_crypto::pin::derive_hash(pin, &salt)?;
                (Some(salt), Some(hash))
            }
            None => (None, None),
        };

        let now = Utc::now();
        let profile = Profile {
            profile_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
            pin_salt,
            pin_hash,
        };

        sqlx::query(
            "INSERT INTO profiles (profile_id, name, created_at, updated_at, pin_salt, pin_hash) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&profile.profile_id)
        .bind(&profile.name)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .bind(&profile.pin_salt)
        .bind(&profile.pin_hash)
        .execute(&self.pool)
        .await?;

        tracing::info!(profile_id = %profile.profile_id, "created profile");
        Ok(profile)
    }

    /// All profiles, most recently touched first. Display convenience only.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT profile_id, name, created_at, updated_at, pin_salt, pin_hash \
             FROM profiles ORDER BY COALESCE(updated_at, created_at) DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    pub async fn get_profile(&self, profile_id: &str) -> Result<Profile, StoreError> {
        sqlx::query_as::<_, Profile>(
            "SELECT profile_id, name, created_at, updated_at, pin_salt, pin_hash \
             FROM profiles WHERE profile_id = ?",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("profile {profile_id}")))
    }

    pub async fn rename_profile(
        &self,
        profile_id: &str,
        name: &str,
    ) -> Result<Profile, StoreError> {
        let name = validate_name(name)?;
        self.get_profile(profile_id).await?;

        sqlx::query("UPDATE profiles SET name = ?, updated_at = ? WHERE profile_id = ?")
            .bind(name)
            .bind(Utc::now())
            .bind(profile_id)
            .execute(&self.pool)
            .await?;

        self.get_profile(profile_id).await
    }

    /// Set (or replace) the PIN. Always derives under a fresh salt.
    pub async fn set_pin(&self, profile_id: &str, pin: &str) -> Result<Profile, StoreError> {
        validate_pin(pin)?;
        self.get_profile(profile_id).await?;

        let salt = ll_crypto::pin::generate_salt()?;
        let hash = ll_crypto::pin::derive_hash(pin, &salt)?;

        sqlx::query(
            "UPDATE profiles SET pin_salt = ?, pin_hash = ?, updated_at = ? WHERE profile_id = ?",
        )
        .bind(&salt)
        .bind(&hash)
        .bind(Utc::now())
        .bind(profile_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(%profile_id, "PIN set");
        self.get_profile(profile_id).await
    }

    pub async fn clear_pin(&self, profile_id: &str) -> Result<Profile, StoreError> {
        self.get_profile(profile_id).await?;

        sqlx::query(
            "UPDATE profiles SET pin_salt = NULL, pin_hash = NULL, updated_at = ? \
             WHERE profile_id = ?",
        )
        .bind(Utc::now())
        .bind(profile_id)
        .execute(&self.pool)
        .await?;

        tracing::info!(%profile_id, "PIN cleared");
        self.get_profile(profile_id).await
    }

    /// Check a PIN attempt against the stored hash.
    ///
    /// A profile without a PIN is always unlocked — the PIN is opt-in
    /// friction for shared devices, not access control, so direct callers
    /// bypassing the UI gate see the same behavior the UI does.
    ///
    /// Plain equality on the derived hash; a local, non-networked deterrent
    /// does not warrant timing-safe comparison.
    pub async fn verify_pin(&self, profile_id: &str, attempt: &str) -> Result<bool, StoreError> {
        let profile = self.get_profile(profile_id).await?;
        match (&profile.pin_salt, &profile.pin_hash) {
            (Some(salt), Some(hash)) => {
                let derived = ll_crypto::pin::derive_hash(attempt, salt)?;
                Ok(&derived == hash)
            }
            _ => Ok(true),
        }
    }

    /// Delete a profile and every progress / quiz row referencing it.
    ///
    /// All three deletes run in one transaction: a failure anywhere aborts
    /// the whole cascade, leaving prior state fully intact.
    pub async fn delete_profile(&self, profile_id: &str) -> Result<(), StoreError> {
        self.get_profile(profile_id).await?;

        let mut tx = self.pool.begin().await?;
        delete_profile_rows(&mut tx, profile_id).await?;
        tx.commit().await?;

        tracing::info!(%profile_id, "deleted profile and dependent rows");
        Ok(())
    }
}

/// Sweep every row referencing `profile_id`, inside the caller's
/// transaction. Committing is the caller's decision; dropping or rolling
/// back the transaction undoes the whole cascade.
pub(crate) async fn delete_profile_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    profile_id: &str,
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM progress WHERE profile_id = ?")
        .bind(profile_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM quiz_results WHERE profile_id = ?")
        .bind(profile_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM profiles WHERE profile_id = ?")
        .bind(profile_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::db::testutil::temp_store;
    use crate::error::StoreError;

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let (_dir, store) = temp_store().await;
        for bad in ["", "   ", "\t\n"] {
            assert!(matches!(
                store.create_profile(bad, None).await,
                Err(StoreError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn create_trims_the_name() {
        let (_dir, store) = temp_store().await;
        let profile = store.create_profile("  Ava  ", None).await.unwrap();
        assert_eq!(profile.name, "Ava");
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_short_pins() {
        let (_dir, store) = temp_store().await;
        assert!(matches!(
            store.create_profile("Ava", Some("123")).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn verify_pin_accepts_the_right_pin_only() {
        let (_dir, store) = temp_store().await;
        let profile = store.create_profile("Ava", Some("1234")).await.unwrap();
        assert!(store.verify_pin(&profile.profile_id, "1234").await.unwrap());
        assert!(!store.verify_pin(&profile.profile_id, "0000").await.unwrap());
    }

    #[tokio::test]
    async fn profile_without_pin_is_always_unlocked() {
        let (_dir, store) = temp_store().await;
        let profile = store.create_profile("Open", None).await.unwrap();
        assert!(!profile.has_pin());
        assert!(store.verify_pin(&profile.profile_id, "anything").await.unwrap());
    }

    #[tokio::test]
    async fn set_and_clear_pin_round_trip() {
        let (_dir, store) = temp_store().await;
        let profile = store.create_profile("Ava", None).await.unwrap();

        let updated = store.set_pin(&profile.profile_id, "9876").await.unwrap();
        assert!(updated.has_pin());
        assert!(store.verify_pin(&profile.profile_id, "9876").await.unwrap());
        assert!(!store.verify_pin(&profile.profile_id, "1234").await.unwrap());

        let cleared = store.clear_pin(&profile.profile_id).await.unwrap();
        assert!(!cleared.has_pin());
        assert!(store.verify_pin(&profile.profile_id, "1234").await.unwrap());
    }

    #[tokio::test]
    async fn rename_bumps_updated_at_and_orders_list() {
        let (_dir, store) = temp_store().await;
        let first = store.create_profile("First", None).await.unwrap();
        let second = store.create_profile("Second", None).await.unwrap();

        let renamed = store.rename_profile(&first.profile_id, "First Renamed").await.unwrap();
        assert_eq!(renamed.name, "First Renamed");
        assert!(renamed.updated_at >= second.updated_at);

        let listed = store.list_profiles().await.unwrap();
        assert_eq!(listed[0].profile_id, first.profile_id);
    }

    #[tokio::test]
    async fn operations_on_unknown_profiles_are_not_found() {
        let (_dir, store) = temp_store().await;
        assert!(matches!(
            store.get_profile("nope").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.rename_profile("nope", "X").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.set_pin("nope", "1234").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_profile("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_cascades_across_all_collections() {
        let (_dir, store) = temp_store().await;
        let keep = store.create_profile("Keep", None).await.unwrap();
        let doomed = store.create_profile("Doomed", None).await.unwrap();

        for profile in [&keep, &doomed] {
            store
                .mark_complete(&profile.profile_id, "arrays-linked-lists")
                .await
                .unwrap();
            store
                .submit_quiz(&profile.profile_id, "q1", 6, 10, &BTreeMap::new())
                .await
                .unwrap();
        }

        store.delete_profile(&doomed.profile_id).await.unwrap();

        assert!(matches!(
            store.get_profile(&doomed.profile_id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.progress_map(&doomed.profile_id).await.unwrap().is_empty());
        assert!(store.all_results(&doomed.profile_id).await.unwrap().is_empty());

        // The sweep is scoped to the target profile.
        assert_eq!(store.progress_map(&keep.profile_id).await.unwrap().len(), 1);
        assert_eq!(store.all_results(&keep.profile_id).await.unwrap().len(), 1);
        let listed = store.list_profiles().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Keep");
    }

    #[tokio::test]
    async fn aborted_cascade_leaves_prior_state_intact() {
        let (_dir, store) = temp_store().await;
        let profile = store.create_profile("Ava", None).await.unwrap();
        store.mark_complete(&profile.profile_id, "loops").await.unwrap();
        store
            .submit_quiz(&profile.profile_id, "q1", 6, 10, &BTreeMap::new())
            .await
            .unwrap();

        // Run the cascade but abort instead of committing, as a failure
        // mid-delete would.
        let mut tx = store.pool.begin().await.unwrap();
        super::delete_profile_rows(&mut tx, &profile.profile_id)
            .await
            .unwrap();
        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quiz_results WHERE profile_id = ?")
                .bind(&profile.profile_id)
                .fetch_one(&mut *tx)
                .await
                .unwrap();
        assert_eq!(remaining, 0);
        tx.rollback().await.unwrap();

        // No partial deletion is observable afterwards.
        assert!(store.get_profile(&profile.profile_id).await.is_ok());
        assert_eq!(store.progress_map(&profile.profile_id).await.unwrap().len(), 1);
        assert_eq!(store.all_results(&profile.profile_id).await.unwrap().len(), 1);
    }
}
