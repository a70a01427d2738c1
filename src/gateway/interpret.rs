use super::transport::HttpResponse;
use crate::error::{ConvertError, GENERIC_FAILURE};
use crate::models::{ConversionOutcome, ConversionResponse};

/// Turn a raw response into an outcome or a user-facing error.
///
/// An `error` field wins regardless of status. A non-2xx response
/// without one becomes `Server responded with <status>`.
pub fn interpret_response(response: HttpResponse) -> Result<ConversionOutcome, ConvertError> {
    let parsed = serde_json::from_slice::<ConversionResponse>(&response.body);

    if let Ok(body) = &parsed
        && let Some(message) = body.error.as_deref().filter(|m| !m.trim().is_empty())
    {
        return Err(ConvertError::Application(message.to_string()));
    }

    if !response.is_success() {
        return Err(ConvertError::transport(format!(
            "Server responded with {}",
            response.status
        )));
    }

    let body = parsed
        .map_err(|e| ConvertError::transport(format!("Unreadable server response: {}", e)))?;
    if body.success == Some(false) {
        return Err(ConvertError::Application(GENERIC_FAILURE.to_string()));
    }
    Ok(body.into_outcome())
}

/// Pass a binary response through, or turn a failed one into the same
/// errors [`interpret_response`] reports.
pub fn ensure_success(response: HttpResponse) -> Result<HttpResponse, ConvertError> {
    if response.is_success() {
        return Ok(response);
    }
    if let Ok(body) = serde_json::from_slice::<ConversionResponse>(&response.body)
        && let Some(message) = body.error.filter(|m| !m.trim().is_empty())
    {
        return Err(ConvertError::Application(message));
    }
    Err(ConvertError::transport(format!("Server responded with {}", response.status)))
}
