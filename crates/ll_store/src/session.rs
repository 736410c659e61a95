//! Active-session pointer: which profile is currently selected.
//!
//! Deliberately kept outside the database — a tiny sidecar file next to it,
//! mirrored in memory so reads never touch disk. A missing or unreadable
//! file just means no profile is selected (fresh start), never an error.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::StoreError;

/// Thread-safe handle to the selected-profile pointer. Cheap to clone.
#[derive(Clone)]
pub struct ActiveProfile {
    path: PathBuf,
    current: Arc<RwLock<Option<String>>>,
}

impl ActiveProfile {
    /// Load the pointer from `path`, tolerating absence.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = std::fs::read_to_string(&path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            path,
            current: Arc::new(RwLock::new(current)),
        }
    }

    /// Currently selected profile id, if any.
    pub async fn get(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// Select a profile and persist the pointer.
    pub async fn select(&self, profile_id: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, profile_id).await?;
        *self.current.write().await = Some(profile_id.to_string());
        tracing::debug!(%profile_id, "selected active profile");
        Ok(())
    }

    /// Clear the pointer (profile switch / logout).
    pub async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *self.current.write().await = None;
        Ok(())
    }
}
