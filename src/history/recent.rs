//! Recently used format tags, kept separately for source and target.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::Storage;

pub const RECENT_FORMATS_KEY: &str = "recent_formats";

/// Entries kept per direction
pub const RECENT_CAP: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFormats {
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default)]
    pub to: Vec<String>,
}

impl RecentFormats {
    /// Load from storage; anything unreadable starts fresh.
    pub fn load<S: Storage>(storage: &S) -> Self {
        match storage.get(RECENT_FORMATS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "recent formats cache is corrupt, starting fresh");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "failed to read recent formats");
                Self::default()
            }
        }
    }

    pub fn save<S: Storage>(&self, storage: &mut S) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = storage.set(RECENT_FORMATS_KEY, &json) {
                    warn!(error = %e, "failed to persist recent formats");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize recent formats"),
        }
    }

    /// Record a used pair, moving each tag to the front of its list.
    pub fn record(&mut self, from: &str, to: &str) {
        push_front(&mut self.from, from);
        push_front(&mut self.to, to);
    }
}

fn push_front(list: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if tag.is_empty() {
        return;
    }
    list.retain(|t| t != tag);
    list.insert(0, tag.to_string());
    list.truncate(RECENT_CAP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_record_moves_to_front_and_dedups() {
        let mut recent = RecentFormats::default();
        recent.record("markdown", "html");
        recent.record("docx", "pdf");
        recent.record("markdown", "pdf");

        assert_eq!(recent.from, vec!["markdown", "docx"]);
        assert_eq!(recent.to, vec!["pdf", "html"]);
    }

    #[test]
    fn test_cap_per_direction() {
        let mut recent = RecentFormats::default();
        for i in 0..8 {
            recent.record(&format!("in{}", i), &format!("out{}", i));
        }
        assert_eq!(recent.from.len(), RECENT_CAP);
        assert_eq!(recent.to.len(), RECENT_CAP);
        assert_eq!(recent.from[0], "in7");
        assert_eq!(recent.to[RECENT_CAP - 1], "out3");
    }

    #[test]
    fn test_blank_tags_ignored() {
        let mut recent = RecentFormats::default();
        recent.record("  ", "html");
        assert!(recent.from.is_empty());
        assert_eq!(recent.to, vec!["html"]);
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::new();
        let mut recent = RecentFormats::default();
        recent.record("rst", "docx");
        recent.save(&mut storage);

        assert_eq!(RecentFormats::load(&storage), recent);
    }

    #[test]
    fn test_corrupt_cache_starts_fresh() {
        let mut storage = MemoryStorage::new();
        storage.set(RECENT_FORMATS_KEY, "[1,2,3]").unwrap();
        assert_eq!(RecentFormats::load(&storage), RecentFormats::default());
    }
}
