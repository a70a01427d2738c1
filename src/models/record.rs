use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::ConversionKind;
use super::response::ConversionOutcome;

/// Result payload kept with a history record. At most one kind is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordResult {
    Download {
        url: String,
    },
    Inline {
        content: String,
    },
    #[default]
    Empty,
}

impl RecordResult {
    /// Pick the payload to keep from a server outcome. The download
    /// reference wins, then inline content, then an image base64 payload.
    pub fn from_outcome(outcome: &ConversionOutcome) -> Self {
        if let Some(url) = outcome.download_url.as_deref().filter(|u| !u.is_empty()) {
            return Self::Download { url: url.to_string() };
        }
        if let Some(content) = outcome.content.as_deref().filter(|c| !c.is_empty()) {
            return Self::Inline { content: content.to_string() };
        }
        if let Some(data) = outcome.base64.as_deref().filter(|d| !d.is_empty()) {
            return Self::Inline { content: data.to_string() };
        }
        Self::Empty
    }

    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::Download { url } => Some(url),
            _ => None,
        }
    }

    pub fn inline_content(&self) -> Option<&str> {
        match self {
            Self::Inline { content } => Some(content),
            _ => None,
        }
    }
}

/// One past conversion, as persisted in client-local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub kind: ConversionKind,
    #[serde(rename = "from")]
    pub from_format: String,
    #[serde(rename = "to")]
    pub to_format: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub result: RecordResult,
}

impl HistoryRecord {
    /// Build a record for a successful conversion finished at `now`.
    pub fn from_outcome(
        name: impl Into<String>,
        kind: ConversionKind,
        from_format: impl Into<String>,
        to_format: impl Into<String>,
        outcome: &ConversionOutcome,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: now.timestamp_millis().max(0) as u64,
            name: name.into(),
            kind,
            from_format: from_format.into(),
            to_format: to_format.into(),
            created_at: now,
            result: RecordResult::from_outcome(outcome),
        }
    }

    /// File name used when inline content is saved locally.
    pub fn blob_file_name(&self) -> String {
        format!("converted-{}-to-{}.txt", self.from_format, self.to_format)
    }
}
