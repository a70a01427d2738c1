//! convert-desk - terminal client for a document conversion server
//!
//! Submits file, text, base64 and image conversions to a pandoc-style
//! conversion server and keeps a local history of the results. It provides:
//!
//! - A persistent, capped conversion history with download, preview and export
//! - Request encoding and response interpretation for the server's endpoints
//! - Preview classification for local files and stored results
//! - A scriptable CLI and an interactive TUI
//!
//! # Example
//!
//! ```no_run
//! use convert_desk::gateway::{ConversionGateway, ReqwestTransport};
//! use convert_desk::models::PendingConversionRequest;
//! use reqwest::Url;
//!
//! let transport = ReqwestTransport::new(Url::parse("http://127.0.0.1:5000")?)?;
//! let gateway = ConversionGateway::new(transport);
//! let request = PendingConversionRequest::text("# Hello", "markdown", "html");
//! let outcome = gateway.submit(&request)?;
//! println!("{:?}", outcome.content);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod gateway;
pub mod history;
pub mod models;
pub mod preview;
pub mod storage;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::ConvertError;
pub use gateway::ConversionGateway;
pub use history::HistoryStore;
pub use models::{HistoryRecord, PendingConversionRequest};
pub use preview::{PreviewCategory, classify};
