//! Conversion request gateway.
//!
//! Builds requests from form state ([`encode_request`]), sends them through
//! an [`HttpTransport`], and interprets the server's reply
//! ([`interpret_response`]). [`spawn_submission`] runs the whole exchange on
//! a worker thread for the TUI.

pub mod client;
pub mod encode;
pub mod interpret;
pub mod submission;
pub mod transport;

pub use client::{ConversionGateway, ExportItem};
pub use encode::{
    CONVERT_ENDPOINT, EncodedRequest, FORMATS_ENDPOINT, HISTORY_EXPORT_ENDPOINT, IMAGE_ENDPOINT,
    encode_request,
};
pub use interpret::{ensure_success, interpret_response};
pub use submission::{SimulatedProgress, Submission, SubmissionState, spawn_submission};
pub use transport::{
    FilePart, HttpResponse, HttpTransport, MultipartForm, ReqwestTransport, RequestBody,
    resolve_url, with_trailing_slash,
};
