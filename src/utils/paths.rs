//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.prospectiq/ unless `PROSPECTIQ_HOME` points elsewhere.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Environment variable that overrides the application directory
pub const HOME_ENV_VAR: &str = "PROSPECTIQ_HOME";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the ProspectIQ directory (`$PROSPECTIQ_HOME` or ~/.prospectiq/)
pub fn prospectiq_dir() -> AppResult<PathBuf> {
    match std::env::var_os(HOME_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(home_dir()?.join(".prospectiq")),
    }
}

/// Get the config file path (<dir>/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(prospectiq_dir()?.join("config.json"))
}

/// Get the database file path (<dir>/data.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(prospectiq_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the ProspectIQ directory, creating if it doesn't exist
pub fn ensure_prospectiq_dir() -> AppResult<PathBuf> {
    let path = prospectiq_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
