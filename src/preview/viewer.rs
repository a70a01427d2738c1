//! Preview content built from local files or stored history records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::dispatcher::{PreviewCategory, classify};
use crate::models::HistoryRecord;
use crate::utils::{format_file_size, sanitize_for_terminal};

/// Upper bound on bytes read for a text preview
pub const MAX_TEXT_PREVIEW_BYTES: u64 = 64 * 1024;

pub const UNSUPPORTED_MESSAGE: &str = "Preview not available for this file type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewBody {
    /// Image shown by reference (terminal cannot draw pixels inline)
    Image { source: String, size: Option<u64> },
    /// Document embedded by reference
    Embedded { source: String, size: Option<u64> },
    /// Decoded, sanitized text
    Text { text: String, truncated: bool },
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewContent {
    pub title: String,
    pub category: PreviewCategory,
    pub body: PreviewBody,
}

impl PreviewContent {
    /// Preview a locally picked file without touching the network.
    pub fn for_local_file(path: &Path) -> Result<Self> {
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let category = classify(&title, None);
        let size = path
            .metadata()
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?
            .len();
        let source = path.display().to_string();

        let body = match category {
            PreviewCategory::Image => PreviewBody::Image { source, size: Some(size) },
            PreviewCategory::Pdf => PreviewBody::Embedded { source, size: Some(size) },
            PreviewCategory::Text => {
                let (text, truncated) = read_text_prefix(path, MAX_TEXT_PREVIEW_BYTES)?;
                PreviewBody::Text { text, truncated }
            }
            PreviewCategory::Unsupported => PreviewBody::Unavailable,
        };

        Ok(Self { title, category, body })
    }

    /// Preview for a history record, `None` when the record has nothing
    /// previewable (no inline content and no image/PDF reference).
    pub fn for_record(record: &HistoryRecord) -> Option<Self> {
        if let Some(content) = record.result.inline_content() {
            return Some(Self::for_text(&record.name, content));
        }

        let url = record.result.download_url()?;
        let category = classify(url, None);
        category.is_embeddable().then(|| Self::for_reference(&record.name, url, category))
    }

    /// Server-side artifact shown by reference.
    pub fn for_reference(title: &str, source: &str, category: PreviewCategory) -> Self {
        let source = source.to_string();
        let body = match category {
            PreviewCategory::Image => PreviewBody::Image { source, size: None },
            PreviewCategory::Pdf => PreviewBody::Embedded { source, size: None },
            PreviewCategory::Text | PreviewCategory::Unsupported => PreviewBody::Unavailable,
        };
        Self { title: title.to_string(), category, body }
    }

    /// Raw text viewer for inline conversion output.
    pub fn for_text(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            category: PreviewCategory::Text,
            body: PreviewBody::Text { text: sanitize_for_terminal(content), truncated: false },
        }
    }

    /// Plain lines describing the preview, used by the CLI and TUI.
    pub fn lines(&self) -> Vec<String> {
        match &self.body {
            PreviewBody::Image { source, size } => {
                vec![format!("[image] {}", source), size_line(*size)]
            }
            PreviewBody::Embedded { source, size } => {
                vec![format!("[pdf] {}", source), size_line(*size)]
            }
            PreviewBody::Text { text, truncated } => {
                let mut lines: Vec<String> = text.lines().map(String::from).collect();
                if *truncated {
                    lines.push(format!(
                        "… preview truncated at {}",
                        format_file_size(MAX_TEXT_PREVIEW_BYTES)
                    ));
                }
                lines
            }
            PreviewBody::Unavailable => vec![UNSUPPORTED_MESSAGE.to_string()],
        }
    }
}

fn size_line(size: Option<u64>) -> String {
    match size {
        Some(bytes) => format!("Size: {}", format_file_size(bytes)),
        None => "Stored on the conversion server".to_string(),
    }
}

fn read_text_prefix(path: &Path, limit: u64) -> Result<(String, bool)> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut buf = Vec::new();
    // Read one byte past the limit to detect truncation
    file.take(limit + 1)
        .read_to_end(&mut buf)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let truncated = buf.len() as u64 > limit;
    buf.truncate(limit as usize);
    let text = String::from_utf8_lossy(&buf);
    Ok((sanitize_for_terminal(&text), truncated))
}

/// Owns the preview currently on screen. Opening a new one or closing the
/// viewer drops the previous content.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    current: Option<PreviewContent>,
}

impl PreviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, content: PreviewContent) {
        if let Some(previous) = self.current.replace(content) {
            debug!(title = %previous.title, "released previous preview");
        }
    }

    pub fn close(&mut self) -> bool {
        match self.current.take() {
            Some(previous) => {
                debug!(title = %previous.title, "released preview");
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&PreviewContent> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}
