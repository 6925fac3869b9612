//! Error type shared by every portal call.

use burwood_util::http::{JsonParseError, status_error_message};
use thiserror::Error;

/// Failure of a single portal operation.
///
/// Each variant is propagated to the caller unchanged; the client never
/// retries.
#[derive(Debug, Error)]
pub enum PortalError {
    /// Username or password was empty. Raised before any request is sent.
    #[error("define username and password")]
    MissingCredentials,

    /// The configured base URL cannot be used.
    #[error("invalid portal base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Connection, timeout or body read failure.
    #[error("portal transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Response body did not match the expected shape.
    #[error(transparent)]
    Decode(#[from] JsonParseError),

    /// Any status other than 200.
    #[error("status: {status}, body: {body}")]
    Status { status: u16, body: String },
}

impl PortalError {
    pub(crate) fn invalid_base_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status of a non-200 response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Remediation hint for authentication and authorization failures.
    pub fn hint(&self) -> Option<String> {
        self.status().and_then(status_error_message)
    }
}
