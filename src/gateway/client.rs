use serde::Serialize;
use tracing::{debug, info};

use super::encode::{FORMATS_ENDPOINT, HISTORY_EXPORT_ENDPOINT, encode_request};
use super::interpret::{ensure_success, interpret_response};
use super::transport::{HttpTransport, RequestBody};
use crate::error::ConvertError;
use crate::models::{
    ConversionKind, ConversionOutcome, FormatCatalog, HistoryRecord, PendingConversionRequest,
};

/// Everything the client asks of the conversion server.
#[derive(Debug, Clone)]
pub struct ConversionGateway<T> {
    transport: T,
}

/// One history entry in the shape the bulk export endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportItem {
    pub filename: String,
    pub from_format: String,
    pub to_format: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_result: Option<String>,
    pub is_file: bool,
}

impl From<&HistoryRecord> for ExportItem {
    fn from(record: &HistoryRecord) -> Self {
        let inline = record.result.inline_content().map(String::from);
        // Inline image results are the base64 payload
        let (content, base64_result) = match record.kind {
            ConversionKind::Image => (None, inline),
            _ => (inline, None),
        };
        let download_url = record.result.download_url().map(String::from);
        Self {
            filename: record.name.clone(),
            from_format: record.from_format.clone(),
            to_format: record.to_format.clone(),
            timestamp: record.created_at.to_rfc3339(),
            content,
            is_file: download_url.is_some(),
            download_url,
            base64_result,
        }
    }
}

impl<T: HttpTransport> ConversionGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate, encode, send and interpret one conversion. Local
    /// failures return before the transport is touched.
    pub fn submit(
        &self,
        request: &PendingConversionRequest,
    ) -> Result<ConversionOutcome, ConvertError> {
        let encoded = encode_request(request)?;
        debug!(endpoint = encoded.endpoint, "Sending conversion request");
        let response = self.transport.post(encoded.endpoint, encoded.body)?;
        let outcome = interpret_response(response)?;
        info!(
            kind = %request.kind,
            from = %request.from_format,
            to = %request.to_format,
            "Conversion succeeded"
        );
        Ok(outcome)
    }

    /// Ask the server to bundle `records` into a ZIP archive.
    pub fn export_history(&self, records: &[HistoryRecord]) -> Result<Vec<u8>, ConvertError> {
        if records.is_empty() {
            return Err(ConvertError::validation("No conversion history to download"));
        }
        let items: Vec<ExportItem> = records.iter().map(ExportItem::from).collect();
        let body = serde_json::to_value(&items)
            .map_err(|e| ConvertError::transport(format!("Failed to encode history: {}", e)))?;
        let response = self.transport.post(HISTORY_EXPORT_ENDPOINT, RequestBody::Json(body))?;
        Ok(ensure_success(response)?.body)
    }

    pub fn fetch_formats(&self) -> Result<FormatCatalog, ConvertError> {
        let response = ensure_success(self.transport.get(FORMATS_ENDPOINT)?)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ConvertError::transport(format!("Unreadable format list: {}", e)))
    }

    pub fn absolute_url(&self, url: &str) -> String {
        self.transport.absolute_url(url)
    }

    /// Download the artifact behind a download reference.
    pub fn fetch_artifact(&self, url: &str) -> Result<Vec<u8>, ConvertError> {
        Ok(ensure_success(self.transport.get(url)?)?.body)
    }
}
