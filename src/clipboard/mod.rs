//! Copying conversion output to the system clipboard.

use anyhow::{Context, Result, bail};
use arboard::Clipboard;

/// Largest result we put on the clipboard (10MB)
pub const MAX_CLIPBOARD_BYTES: usize = 10 * 1024 * 1024;

/// Destination for copied text. The TUI holds one of these so tests can
/// substitute [`RecordingClipboard`].
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard, opened on first use so headless sessions only fail
/// when a copy is actually attempted.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new().context("Clipboard is not available")?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(text).context("Failed to set clipboard contents")?;
        }
        Ok(())
    }
}

/// Keeps the last copied text in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingClipboard {
    pub last: Option<String>,
}

impl ClipboardSink for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.last = Some(text.to_string());
        Ok(())
    }
}

fn validate(text: &str) -> Result<()> {
    if text.is_empty() {
        bail!("Nothing to copy");
    }
    if text.len() > MAX_CLIPBOARD_BYTES {
        bail!(
            "Result too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_BYTES
        );
    }
    Ok(())
}

/// Validate `text` and hand it to `sink`.
pub fn copy_with(sink: &mut dyn ClipboardSink, text: &str) -> Result<()> {
    validate(text)?;
    sink.set_text(text)
}

/// Copy `text` to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    copy_with(&mut SystemClipboard::new(), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingClipboard;

    impl ClipboardSink for FailingClipboard {
        fn set_text(&mut self, _text: &str) -> Result<()> {
            bail!("clipboard locked")
        }
    }

    #[test]
    fn test_copy_records_text() {
        let mut sink = RecordingClipboard::default();
        copy_with(&mut sink, "<h1>Converted</h1>\n").unwrap();
        assert_eq!(sink.last.as_deref(), Some("<h1>Converted</h1>\n"));
    }

    #[test]
    fn test_empty_rejected_before_sink() {
        let mut sink = FailingClipboard;
        let err = copy_with(&mut sink, "").unwrap_err();
        assert_eq!(err.to_string(), "Nothing to copy");
    }

    #[test]
    fn test_size_limit_counts_bytes() {
        let mut sink = RecordingClipboard::default();
        assert!(copy_with(&mut sink, &"a".repeat(MAX_CLIPBOARD_BYTES)).is_ok());

        let err = copy_with(&mut sink, &"🚀".repeat(MAX_CLIPBOARD_BYTES / 4 + 1)).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_sink_failure_propagates() {
        let err = copy_with(&mut FailingClipboard, "text").unwrap_err();
        assert!(err.to_string().contains("clipboard locked"));
    }

    #[test]
    fn test_system_clipboard_validates_first() {
        assert!(copy_to_clipboard("").is_err());
    }
}
