//! Data models for the conversion client.
//!
//! - [`HistoryRecord`] - a persisted summary of one finished conversion
//! - [`PendingConversionRequest`] - form state captured at submit time
//! - [`ConversionOutcome`] - the interpreted success response
//! - [`FormatCatalog`] - input/output formats offered by the server
//!
//! Records and catalogs are serde types; the response type accepts both
//! historical spellings of its fields.

pub mod record;
pub mod request;
pub mod response;

pub use record::{HistoryRecord, RecordResult};
pub use request::{ConversionKind, ImageSettings, OptionTags, Payload, PendingConversionRequest};
pub use response::{
    ConversionOutcome, ConversionResponse, FormatCatalog, IMAGE_FORMATS, PrimaryResult,
};
