//! Side effects behind history row controls.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::view::DownloadAction;
use crate::gateway::{ConversionGateway, HttpTransport};
use crate::models::HistoryRecord;
use crate::utils::sanitize_file_name;

/// File written by the local history export.
pub const LOCAL_EXPORT_FILE: &str = "conversion_history.json";

/// File written by the server-side history export.
pub const ARCHIVE_EXPORT_FILE: &str = "conversion_history.zip";

/// Carry out a row's download control, writing into `out_dir`. Returns the
/// path written.
pub fn perform_download<T: HttpTransport>(
    action: &DownloadAction,
    gateway: &ConversionGateway<T>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let (file_name, bytes) = match action {
        DownloadAction::Navigate { url } => {
            let bytes = gateway
                .fetch_artifact(url)
                .with_context(|| format!("Failed to download {}", url))?;
            (artifact_file_name(url), bytes)
        }
        DownloadAction::SaveBlob { file_name, content } => {
            (sanitize_file_name(file_name), content.clone().into_bytes())
        }
    };

    let path = write_into(out_dir, &file_name, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved conversion result");
    Ok(path)
}

/// Write the raw history as pretty JSON, without contacting the server.
pub fn dump_local(records: &[HistoryRecord], out_dir: &Path) -> Result<PathBuf> {
    let json =
        serde_json::to_string_pretty(records).context("Failed to serialize conversion history")?;
    write_into(out_dir, LOCAL_EXPORT_FILE, json.as_bytes())
}

/// Save a ZIP produced by the export endpoint.
pub fn save_archive(bytes: &[u8], out_dir: &Path) -> Result<PathBuf> {
    write_into(out_dir, ARCHIVE_EXPORT_FILE, bytes)
}

/// Local name for a download reference: its last path segment, without
/// query or fragment.
pub fn artifact_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    sanitize_file_name(segment)
}

fn write_into(out_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;
    let path = out_dir.join(file_name);
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
