//! Error taxonomy for conversion submissions.
//!
//! Every failure a user can see while converting falls into one of these
//! buckets. None of them is fatal: the TUI shows the message and stays
//! interactive, the CLI reports it and exits non-zero.
//!
//! Storage problems are deliberately absent here. Unreadable history is
//! treated as empty and failed writes are logged, see
//! [`crate::history::HistoryStore`].

use std::path::PathBuf;

use thiserror::Error;

/// Generic message used when the server reports failure without details.
pub const GENERIC_FAILURE: &str = "Conversion failed";

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Form state is incomplete. Raised before any request is built.
    #[error("{0}")]
    Validation(String),

    /// Network failure, non-success status or unreadable response body.
    #[error("{0}")]
    Transport(String),

    /// Well-formed response carrying an explicit error message.
    #[error("{0}")]
    Application(String),

    /// A local file needed for the request could not be read or written.
    #[error("Cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// True when the request was never sent.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_surfaced_verbatim() {
        let err = ConvertError::Application("Text is required".to_string());
        assert_eq!(err.to_string(), "Text is required");

        let err = ConvertError::validation("Please select a file");
        assert_eq!(err.to_string(), "Please select a file");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = ConvertError::Io {
            path: PathBuf::from("/tmp/missing.docx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/missing.docx"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_is_local() {
        assert!(ConvertError::validation("x").is_local());
        assert!(!ConvertError::transport("x").is_local());
        assert!(!ConvertError::Application("x".into()).is_local());
    }
}
