//! # HTTP Utilities
//!
//! Response decoding helpers shared by the portal client and the CLI.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Return a user-friendly hint for common HTTP status codes.
///
/// # Example
/// ```rust
/// use burwood_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("PORTAL_USERNAME"));
/// assert!(error_401.contains("Unauthorized"));
///
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: check PORTAL_USERNAME/PORTAL_PASSWORD or the access token".into()),
        403 => Some("Forbidden (403). Hint: check the portal role of the configured user".into()),
        _ => None,
    }
}

/// Decode HTTP response text into `T`, providing detailed errors on failure.
///
/// Any parsing error is decorated with the originating HTTP status code plus
/// a truncated preview of the response body. A body of the wrong shape (for
/// example an object where an array is expected) is a parse failure too.
///
/// # Errors
/// Returns a [`JsonParseError`] carrying the serde error and up to 200
/// characters of the response body with whitespace collapsed.
pub fn decode_response<T>(text: &str, status: Option<StatusCode>) -> Result<T, JsonParseError>
where
    T: DeserializeOwned,
{
    serde_json::from_str::<T>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, 200);

        JsonParseError::new(status_note, error, preview)
    })
}

/// Collapse whitespace and cut `text` after roughly `limit` bytes.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON decoding of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to decode JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    /// Create a new [`JsonParseError`] with contextual information.
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }

    /// Access the underlying serde parse error for logging or inspection.
    pub fn source_error(&self) -> &serde_json::Error {
        &self.source
    }
}
