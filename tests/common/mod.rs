//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, TimeZone, Utc};
use convert_desk::ConvertError;
use convert_desk::gateway::{HttpResponse, HttpTransport, RequestBody};
use convert_desk::models::{ConversionKind, HistoryRecord, RecordResult};
use tempfile::TempDir;

/// Builder for history records with fixed, increasing timestamps
pub struct RecordBuilder {
    record: HistoryRecord,
}

impl RecordBuilder {
    pub fn new(id: u64, name: &str) -> Self {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        Self {
            record: HistoryRecord {
                id,
                name: name.to_string(),
                kind: ConversionKind::File,
                from_format: "markdown".to_string(),
                to_format: "pdf".to_string(),
                created_at: base + Duration::minutes(id as i64),
                result: RecordResult::Empty,
            },
        }
    }

    pub fn kind(mut self, kind: ConversionKind) -> Self {
        self.record.kind = kind;
        self
    }

    pub fn formats(mut self, from: &str, to: &str) -> Self {
        self.record.from_format = from.to_string();
        self.record.to_format = to.to_string();
        self
    }

    pub fn download(mut self, url: &str) -> Self {
        self.record.result = RecordResult::Download { url: url.to_string() };
        self
    }

    pub fn inline(mut self, content: &str) -> Self {
        self.record.result = RecordResult::Inline { content: content.to_string() };
        self
    }

    pub fn build(self) -> HistoryRecord {
        self.record
    }
}

/// Data directory pre-seeded with a stored history (newest first)
pub fn data_dir_with_history(records: &[HistoryRecord]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let json = serde_json::to_string(records).expect("Failed to serialize history");
    fs::write(dir.path().join("conversion_history.json"), json)
        .expect("Failed to write conversion_history.json");
    dir
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Transport answering every request with a canned response
pub struct CannedTransport {
    pub status: u16,
    pub body: Vec<u8>,
    pub requests: Mutex<Vec<(String, Option<RequestBody>)>>,
}

impl CannedTransport {
    pub fn json(status: u16, body: &str) -> Self {
        Self { status, body: body.as_bytes().to_vec(), requests: Mutex::new(Vec::new()) }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpTransport for CannedTransport {
    fn post(&self, path: &str, body: RequestBody) -> Result<HttpResponse, ConvertError> {
        self.requests.lock().unwrap().push((path.to_string(), Some(body)));
        Ok(HttpResponse { status: self.status, body: self.body.clone() })
    }

    fn get(&self, path: &str) -> Result<HttpResponse, ConvertError> {
        self.requests.lock().unwrap().push((path.to_string(), None));
        Ok(HttpResponse { status: self.status, body: self.body.clone() })
    }
}

/// Transport whose every call fails like a refused connection
pub struct OfflineTransport;

impl HttpTransport for OfflineTransport {
    fn post(&self, _path: &str, _body: RequestBody) -> Result<HttpResponse, ConvertError> {
        Err(ConvertError::transport("Connection refused"))
    }

    fn get(&self, _path: &str) -> Result<HttpResponse, ConvertError> {
        Err(ConvertError::transport("Connection refused"))
    }
}
