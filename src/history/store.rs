//! Persistent conversion history, newest first, capped at [`HISTORY_CAP`].

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::models::HistoryRecord;
use crate::storage::Storage;

/// Storage key holding the serialized history array
pub const HISTORY_KEY: &str = "conversion_history";

/// Maximum number of records kept
pub const HISTORY_CAP: usize = 20;

/// Asks the user before an irreversible operation.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// A confirmation already answered elsewhere (TUI modal, `--yes` flag).
#[derive(Debug, Clone, Copy)]
pub struct Answered(pub bool);

impl Confirm for Answered {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Blocking y/N prompt on a reader/writer pair.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl PromptConfirm<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self { input: io::stdin().lock(), output: io::stderr() }
    }
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{} [y/N] ", prompt).and_then(|_| self.output.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if self.input.read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub struct HistoryStore<S> {
    storage: S,
}

impl<S: Storage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Current records, newest first. Missing or unreadable data is empty.
    pub fn list(&self) -> Vec<HistoryRecord> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read conversion history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryRecord>>(&raw) {
            Ok(mut records) => {
                records.truncate(HISTORY_CAP);
                records
            }
            Err(e) => {
                warn!(error = %e, "stored conversion history is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// Insert `record` at the front and drop anything beyond the cap.
    /// Returns the stored record, whose id may have been bumped to stay
    /// above the previous newest one.
    pub fn append(&mut self, mut record: HistoryRecord) -> HistoryRecord {
        let mut records = self.list();
        if let Some(newest) = records.first()
            && record.id <= newest.id
        {
            record.id = newest.id + 1;
        }

        records.insert(0, record.clone());
        records.truncate(HISTORY_CAP);
        debug!(id = record.id, count = records.len(), "appended history record");
        self.persist(&records);
        record
    }

    /// Delete the record at `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<HistoryRecord> {
        let mut records = self.list();
        if index >= records.len() {
            return None;
        }
        let removed = records.remove(index);
        self.persist(&records);
        Some(removed)
    }

    /// Remove every record once `confirm` grants it. Returns whether the
    /// history was cleared.
    pub fn clear(&mut self, confirm: &mut dyn Confirm) -> bool {
        if !confirm.confirm("Are you sure you want to clear all conversion history?") {
            debug!("clear history declined");
            return false;
        }
        if let Err(e) = self.storage.remove(HISTORY_KEY) {
            warn!(error = %e, "failed to clear conversion history");
        }
        true
    }

    /// Best-effort write; failures are logged, not recovered.
    fn persist(&mut self, records: &[HistoryRecord]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize conversion history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            warn!(error = %e, "failed to persist conversion history");
        }
    }
}
