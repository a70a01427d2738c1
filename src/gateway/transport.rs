//! HTTP transport seam.
//!
//! Requests are described with plain data ([`RequestBody`]) so encoding can
//! be inspected in tests; [`ReqwestTransport`] turns them into real calls.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, multipart};
use tracing::debug;

use crate::error::ConvertError;

/// Binary part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Multipart(MultipartForm),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP calls used by the gateway. `path` is either absolute or
/// relative to the configured server.
pub trait HttpTransport: Send + Sync {
    fn post(&self, path: &str, body: RequestBody) -> Result<HttpResponse, ConvertError>;

    fn get(&self, path: &str) -> Result<HttpResponse, ConvertError>;

    /// Absolute form of a download reference, for display and copying.
    fn absolute_url(&self, path: &str) -> String {
        path.to_string()
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn post(&self, path: &str, body: RequestBody) -> Result<HttpResponse, ConvertError> {
        (**self).post(path, body)
    }

    fn get(&self, path: &str) -> Result<HttpResponse, ConvertError> {
        (**self).get(path)
    }

    fn absolute_url(&self, path: &str) -> String {
        (**self).absolute_url(path)
    }
}

/// Real transport backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url) -> Result<Self, ConvertError> {
        let client = Client::builder()
            .user_agent(concat!("convert-desk/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ConvertError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base_url: with_trailing_slash(base_url) })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, ConvertError> {
        resolve_url(&self.base_url, path)
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse, ConvertError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| ConvertError::transport(format!("Failed to read response: {}", e)))?;
        Ok(HttpResponse { status, body: body.to_vec() })
    }
}

/// Treat the last path segment as a directory so relative endpoints land
/// under it (`http://h/app` + `convert` is `http://h/app/convert`).
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Join an endpoint or a download reference onto the server URL.
/// Root-absolute references (`/download/..`) resolve against the host.
pub fn resolve_url(base: &Url, path: &str) -> Result<Url, ConvertError> {
    base.join(path)
        .map_err(|e| ConvertError::transport(format!("Invalid URL '{}': {}", path, e)))
}

fn to_form(form: MultipartForm) -> Result<multipart::Form, ConvertError> {
    let mut out = multipart::Form::new();
    for (name, value) in form.fields {
        out = out.text(name, value);
    }
    if let Some(file) = form.file {
        let bytes = std::fs::read(&file.path)
            .map_err(|source| ConvertError::Io { path: file.path.clone(), source })?;
        let part = multipart::Part::bytes(bytes)
            .file_name(file.file_name)
            .mime_str(&file.mime)
            .map_err(|e| ConvertError::transport(format!("Invalid MIME type: {}", e)))?;
        out = out.part(file.field, part);
    }
    Ok(out)
}

impl HttpTransport for ReqwestTransport {
    fn post(&self, path: &str, body: RequestBody) -> Result<HttpResponse, ConvertError> {
        let url = self.resolve(path)?;
        debug!(%url, "POST");
        let request = match body {
            RequestBody::Multipart(form) => self.client.post(url.clone()).multipart(to_form(form)?),
            RequestBody::Json(value) => self.client.post(url.clone()).json(&value),
        };
        let response = request
            .send()
            .map_err(|e| ConvertError::transport(format!("Request to {} failed: {}", url, e)))?;
        Self::read(response)
    }

    fn get(&self, path: &str) -> Result<HttpResponse, ConvertError> {
        let url = self.resolve(path)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| ConvertError::transport(format!("Request to {} failed: {}", url, e)))?;
        Self::read(response)
    }

    fn absolute_url(&self, path: &str) -> String {
        self.resolve(path).map(String::from).unwrap_or_else(|_| path.to_string())
    }
}
