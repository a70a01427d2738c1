use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CONVERT_DESK_DATA_DIR";

const APP_DIR_NAME: &str = "convert-desk";

/// Default data directory: `$CONVERT_DESK_DATA_DIR`, else the platform
/// local data directory joined with `convert-desk`.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_local_dir().context("Failed to get platform data directory")?;
    Ok(base.join(APP_DIR_NAME))
}

/// Where downloads land when no output directory is given.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
