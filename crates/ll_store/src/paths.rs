use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "io";
pub const APP_ORG: &str = "lessonlock";
pub const APP_NAME: &str = "lessonlock";

/// Database file name inside the data directory.
pub const DB_FILE: &str = "lessonlock.db";

/// Sidecar file holding the currently selected profile id.
pub const ACTIVE_PROFILE_FILE: &str = "active_profile";

pub fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(override_dir) = std::env::var("LESSONLOCK_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("cannot determine data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

pub fn db_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILE))
}

pub fn active_profile_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join(ACTIVE_PROFILE_FILE))
}
