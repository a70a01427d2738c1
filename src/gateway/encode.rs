//! Form state → outbound request.

use serde_json::{Map, Value};

use super::transport::{FilePart, MultipartForm, RequestBody};
use crate::error::ConvertError;
use crate::models::{ConversionKind, Payload, PendingConversionRequest};
use crate::preview::mime_for;

/// Endpoints are joined onto the server URL, keeping any path prefix.
pub const CONVERT_ENDPOINT: &str = "convert";
pub const IMAGE_ENDPOINT: &str = "convert/image";
pub const HISTORY_EXPORT_ENDPOINT: &str = "api/history/download";
pub const FORMATS_ENDPOINT: &str = "api/formats";

/// Endpoint plus body for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRequest {
    pub endpoint: &'static str,
    pub body: RequestBody,
}

/// Validate `request` and encode it. File and image payloads become
/// multipart forms; text and base64 payloads become JSON objects.
pub fn encode_request(request: &PendingConversionRequest) -> Result<EncodedRequest, ConvertError> {
    request.validate()?;

    match (&request.kind, &request.payload) {
        (ConversionKind::File | ConversionKind::Image, Payload::File(path)) => {
            let metadata = std::fs::metadata(path)
                .map_err(|source| ConvertError::Io { path: path.clone(), source })?;
            if !metadata.is_file() {
                return Err(ConvertError::validation(format!(
                    "'{}' is not a regular file",
                    path.display()
                )));
            }

            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let is_image = request.kind == ConversionKind::Image;

            let mut fields = Vec::new();
            if !is_image {
                fields.push(("conversion_type".to_string(), request.kind.as_str().to_string()));
                fields.push(("from_format".to_string(), request.from_format.clone()));
            }
            fields.push(("to_format".to_string(), request.to_format.clone()));
            if let Some(options) = request.options.to_wire() {
                fields.push(("options".to_string(), options));
            }
            if is_image {
                if let Some(quality) = request.image.quality {
                    fields.push(("quality".to_string(), quality.to_string()));
                }
                let resize = request.image.resize.as_deref().map(str::trim);
                if let Some(resize) = resize.filter(|r| !r.is_empty()) {
                    fields.push(("resize".to_string(), resize.to_string()));
                }
            }

            let file = FilePart {
                field: if is_image { "image" } else { "file" }.to_string(),
                path: path.clone(),
                mime: mime_for(&file_name).to_string(),
                file_name,
            };

            Ok(EncodedRequest {
                endpoint: if is_image { IMAGE_ENDPOINT } else { CONVERT_ENDPOINT },
                body: RequestBody::Multipart(MultipartForm { fields, file: Some(file) }),
            })
        }
        (ConversionKind::Text, Payload::Text(text)) => Ok(json_request(request, "text", text)),
        (ConversionKind::Base64, Payload::Base64(data)) => {
            Ok(json_request(request, "base64_data", data.trim()))
        }
        // validate() already rejects mismatched payloads
        (kind, _) => Err(ConvertError::validation(format!(
            "Payload does not match a {} conversion",
            kind
        ))),
    }
}

fn json_request(
    request: &PendingConversionRequest,
    payload_field: &str,
    payload: &str,
) -> EncodedRequest {
    let mut body = Map::new();
    body.insert("conversion_type".into(), Value::from(request.kind.as_str()));
    body.insert("from_format".into(), Value::from(request.from_format.as_str()));
    body.insert("to_format".into(), Value::from(request.to_format.as_str()));
    if let Some(options) = request.options.to_wire() {
        body.insert("options".into(), Value::from(options));
    }
    body.insert(payload_field.into(), Value::from(payload));

    EncodedRequest { endpoint: CONVERT_ENDPOINT, body: RequestBody::Json(Value::Object(body)) }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::models::{ImageSettings, OptionTags};

    #[test]
    fn test_text_request_is_json() {
        let request = PendingConversionRequest::text("# Hi", "markdown", "html")
            .with_options(["--standalone", "--toc"].into_iter().collect::<OptionTags>());
        let encoded = encode_request(&request).unwrap();

        assert_eq!(encoded.endpoint, CONVERT_ENDPOINT);
        let RequestBody::Json(body) = encoded.body else { panic!("expected JSON body") };
        assert_eq!(body["conversion_type"], "text");
        assert_eq!(body["from_format"], "markdown");
        assert_eq!(body["to_format"], "html");
        assert_eq!(body["text"], "# Hi");
        assert_eq!(body["options"], "--standalone --toc");
    }

    #[test]
    fn test_base64_request_omits_empty_options() {
        let request = PendingConversionRequest::base64(" aGVsbG8= \n", "markdown", "html");
        let RequestBody::Json(body) = encode_request(&request).unwrap().body else {
            panic!("expected JSON body")
        };
        assert_eq!(body["conversion_type"], "base64");
        assert_eq!(body["base64_data"], "aGVsbG8=");
        assert!(body.get("options").is_none());
    }

    #[test]
    fn test_file_request_is_multipart() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.docx");
        fs::write(&path, b"PK").unwrap();

        let request = PendingConversionRequest::file(&path, "docx", "pdf");
        let encoded = encode_request(&request).unwrap();
        assert_eq!(encoded.endpoint, CONVERT_ENDPOINT);

        let RequestBody::Multipart(form) = encoded.body else { panic!("expected multipart") };
        assert_eq!(form.field("conversion_type"), Some("file"));
        assert_eq!(form.field("from_format"), Some("docx"));
        assert_eq!(form.field("to_format"), Some("pdf"));
        let file = form.file.unwrap();
        assert_eq!(file.field, "file");
        assert_eq!(file.file_name, "report.docx");
    }

    #[test]
    fn test_image_request_uses_image_endpoint() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.png");
        fs::write(&path, [0u8; 16]).unwrap();

        let request = PendingConversionRequest::image(&path, "webp").with_image_settings(
            ImageSettings { quality: Some(80), resize: Some(" 800x600 ".to_string()) },
        );
        let encoded = encode_request(&request).unwrap();
        assert_eq!(encoded.endpoint, IMAGE_ENDPOINT);

        let RequestBody::Multipart(form) = encoded.body else { panic!("expected multipart") };
        assert_eq!(form.field("to_format"), Some("webp"));
        assert_eq!(form.field("quality"), Some("80"));
        assert_eq!(form.field("resize"), Some("800x600"));
        assert_eq!(form.field("conversion_type"), None);
        let file = form.file.unwrap();
        assert_eq!(file.field, "image");
        assert_eq!(file.mime, "image/png");
    }

    #[test]
    fn test_missing_file_is_local_error() {
        let request = PendingConversionRequest::file("/nonexistent/in.docx", "docx", "pdf");
        let err = encode_request(&request).unwrap_err();
        assert!(err.is_local());
    }

    #[test]
    fn test_directory_rejected() {
        let temp = TempDir::new().unwrap();
        let request = PendingConversionRequest::file(temp.path(), "docx", "pdf");
        assert!(matches!(encode_request(&request), Err(ConvertError::Validation(_))));
    }

    #[test]
    fn test_validation_runs_first() {
        let request = PendingConversionRequest::text("", "markdown", "html");
        assert!(matches!(encode_request(&request), Err(ConvertError::Validation(_))));
    }
}
