//! File preview dispatch.
//!
//! [`classify`] decides how a file is shown from its name and optional MIME
//! type, without I/O. [`PreviewContent`] turns a local file or stored
//! history record into something the CLI and TUI can render, and
//! [`PreviewSlot`] owns whatever preview is currently open.

pub mod dispatcher;
pub mod viewer;

pub use dispatcher::{PreviewCategory, classify, extension_of, mime_for};
pub use viewer::{PreviewBody, PreviewContent, PreviewSlot, UNSUPPORTED_MESSAGE};
