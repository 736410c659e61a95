//! Database abstraction over SQLite via sqlx.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use tokio::sync::OnceCell;

use crate::error::StoreError;
use crate::paths;

static SHARED: OnceCell<Store> = OnceCell::const_new();

/// Central store handle.  Cheap to clone (Arc internally).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path`.
    /// Runs all pending migrations automatically.
    ///
    /// WAL journal mode and foreign-key enforcement are configured at
    /// connection time, not inside a migration — SQLite forbids changing
    /// `journal_mode` inside a transaction and sqlx wraps every migration
    /// in one.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(opts).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::debug!(path = %db_path.display(), "opened profile store");
        Ok(Self { pool })
    }

    /// Process-wide shared handle, opened at the default data path.
    ///
    /// The first caller pays the open/migration cost; every later caller
    /// receives the same live handle. An open failure (e.g. the data
    /// directory cannot be created) is fatal to that first call and is not
    /// retried here.
    pub async fn shared() -> Result<Store, StoreError> {
        SHARED
            .get_or_try_init(|| async {
                let path = paths::db_path().map_err(|e| StoreError::DataDir(e.to_string()))?;
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Store::open(&path).await
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::Store;
    use tempfile::TempDir;

    /// Fresh store in a throwaway directory. Keep the `TempDir` alive for
    /// the duration of the test or the file disappears under the pool.
    pub async fn temp_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = Store::open(&dir.path().join("lessonlock.db"))
            .await
            .expect("open store");
        (dir, store)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::temp_store;
    use super::Store;

    #[tokio::test]
    async fn open_is_idempotent_on_the_same_file() {
        let (dir, store) = temp_store().await;
        let path = dir.path().join("lessonlock.db");
        store.pool.close().await;

        // Second open re-runs migrations against the existing schema.
        let reopened = Store::open(&path).await.expect("reopen store");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&reopened.pool)
            .await
            .expect("query profiles");
        assert_eq!(count, 0);
    }
}
