//! Projection of stored records into renderable list items.
//!
//! [`project`] decides which actions each row offers; the TUI list and the
//! CLI table both draw from the same [`HistoryItemView`]s.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::models::{HistoryRecord, RecordResult};
use crate::preview::{PreviewCategory, classify};
use crate::utils::{format_stamp, sanitize_for_terminal, truncate_for_display};

/// Shown instead of an empty record name.
pub const UNTITLED: &str = "Untitled conversion";

pub const EMPTY_HISTORY_MESSAGE: &str = "No conversion history yet";

/// What the download control of a row does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadAction {
    /// Fetch the server artifact behind the reference.
    Navigate { url: String },
    /// Save inline content as a synthesized text file.
    SaveBlob { file_name: String, content: String },
}

/// What the preview control of a row does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewAction {
    ShowText { title: String, content: String },
    Embed { url: String, category: PreviewCategory },
}

/// One rendered history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItemView {
    pub index: usize,
    pub id: u64,
    pub title: String,
    pub from_format: String,
    pub to_format: String,
    pub created_at: DateTime<Utc>,
    pub download: Option<DownloadAction>,
    pub preview: Option<PreviewAction>,
}

impl HistoryItemView {
    /// Delete is offered for every row.
    pub fn can_delete(&self) -> bool {
        true
    }

    /// `md → pdf`
    pub fn formats_label(&self) -> String {
        format!("{} → {}", self.from_format, self.to_format)
    }
}

pub fn project(records: &[HistoryRecord]) -> Vec<HistoryItemView> {
    records.iter().enumerate().map(|(index, record)| project_one(index, record)).collect()
}

fn project_one(index: usize, record: &HistoryRecord) -> HistoryItemView {
    let title = if record.name.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        record.name.clone()
    };

    let (download, preview) = match &record.result {
        RecordResult::Download { url } => {
            let category = classify(url, None);
            let preview = category
                .is_embeddable()
                .then(|| PreviewAction::Embed { url: url.clone(), category });
            (Some(DownloadAction::Navigate { url: url.clone() }), preview)
        }
        RecordResult::Inline { content } => (
            Some(DownloadAction::SaveBlob {
                file_name: record.blob_file_name(),
                content: content.clone(),
            }),
            Some(PreviewAction::ShowText {
                title: format!("{} ({} to {})", title, record.from_format, record.to_format),
                content: content.clone(),
            }),
        ),
        RecordResult::Empty => (None, None),
    };

    HistoryItemView {
        index,
        id: record.id,
        title,
        from_format: record.from_format.clone(),
        to_format: record.to_format.clone(),
        created_at: record.created_at,
        download,
        preview,
    }
}

/// Plain-text table for the CLI.
pub fn render_table(items: &[HistoryItemView]) -> String {
    if items.is_empty() {
        return format!("{}\n", EMPTY_HISTORY_MESSAGE);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<32}  {:<24}  {:<16}  ACTIONS",
        "#", "NAME", "FORMATS", "CREATED"
    );
    for item in items {
        let mut actions = Vec::new();
        if item.download.is_some() {
            actions.push("download");
        }
        if item.preview.is_some() {
            actions.push("preview");
        }
        if item.can_delete() {
            actions.push("delete");
        }
        let _ = writeln!(
            out,
            "{:>3}  {:<32}  {:<24}  {:<16}  {}",
            item.index,
            truncate_for_display(&sanitize_for_terminal(&item.title), 32),
            truncate_for_display(&sanitize_for_terminal(&item.formats_label()), 24),
            format_stamp(&item.created_at),
            actions.join(",")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::ConversionKind;

    fn record(name: &str, from: &str, to: &str, result: RecordResult) -> HistoryRecord {
        HistoryRecord {
            id: 7,
            name: name.to_string(),
            kind: ConversionKind::Text,
            from_format: from.to_string(),
            to_format: to.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            result,
        }
    }

    #[test]
    fn test_inline_content_saves_as_blob() {
        let items = project(&[record(
            "Text conversion",
            "md",
            "pdf",
            RecordResult::Inline { content: "hello".to_string() },
        )]);
        assert_eq!(
            items[0].download,
            Some(DownloadAction::SaveBlob {
                file_name: "converted-md-to-pdf.txt".to_string(),
                content: "hello".to_string(),
            })
        );
        assert!(matches!(items[0].preview, Some(PreviewAction::ShowText { .. })));
    }

    #[test]
    fn test_pdf_reference_is_embeddable() {
        let items = project(&[record(
            "report.docx",
            "docx",
            "pdf",
            RecordResult::Download { url: "/download/report.pdf".to_string() },
        )]);
        assert_eq!(
            items[0].preview,
            Some(PreviewAction::Embed {
                url: "/download/report.pdf".to_string(),
                category: PreviewCategory::Pdf,
            })
        );
        assert_eq!(
            items[0].download,
            Some(DownloadAction::Navigate { url: "/download/report.pdf".to_string() })
        );
    }

    #[test]
    fn test_other_reference_has_no_preview() {
        let items = project(&[record(
            "a.md",
            "md",
            "docx",
            RecordResult::Download { url: "/download/a.docx".to_string() },
        )]);
        assert!(items[0].download.is_some());
        assert!(items[0].preview.is_none());
    }

    #[test]
    fn test_empty_result_hides_download_and_preview() {
        let items = project(&[record("x", "md", "html", RecordResult::Empty)]);
        assert!(items[0].download.is_none());
        assert!(items[0].preview.is_none());
        assert!(items[0].can_delete());
    }

    #[test]
    fn test_untitled_name() {
        let items = project(&[record("  ", "md", "html", RecordResult::Empty)]);
        assert_eq!(items[0].title, UNTITLED);
    }

    #[test]
    fn test_indices_follow_order() {
        let items = project(&[
            record("b", "html", "md", RecordResult::Empty),
            record("a", "md", "pdf", RecordResult::Empty),
        ]);
        assert_eq!(items.iter().map(|i| i.index).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(items[0].title, "b");
    }

    #[test]
    fn test_render_table() {
        assert_eq!(render_table(&[]), "No conversion history yet\n");

        let items = project(&[record(
            "notes.md",
            "md",
            "html",
            RecordResult::Inline { content: "<p/>".to_string() },
        )]);
        let table = render_table(&items);
        assert!(table.contains("notes.md"));
        assert!(table.contains("md → html"));
        assert!(table.contains("2025-03-01 09:30"));
        assert!(table.contains("download,preview,delete"));
    }

    #[test]
    fn test_render_table_strips_escapes() {
        let items = project(&[record("evil\x1b[2J.md", "md", "html", RecordResult::Empty)]);
        let table = render_table(&items);
        assert!(!table.contains('\x1b'));
        assert!(table.contains("evil"));
    }
}
