//! Error types for client, configuration and storage operations.

use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;
use vitrine_api_models::ErrorBody;

/// Failure surfaced by an [`crate::ApiClient`] call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request path could not be joined onto the base URL.
    #[error("invalid request URL for '{path}': {source}")]
    InvalidUrl {
        /// Request path relative to the base URL.
        path: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The request never produced an HTTP response (connect, timeout, body read).
    #[error("request to {path} failed: {source}")]
    Transport {
        /// Request path relative to the base URL.
        path: String,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status.
    #[error("{message} (status {status})")]
    Status {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Request path relative to the base URL.
        path: String,
        /// Message extracted from the error body.
        message: String,
    },
    /// The response body did not match the expected document.
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        /// Request path relative to the base URL.
        path: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// The request body could not be serialised.
    #[error("failed to encode request body: {source}")]
    Encode {
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// The login response carried an empty access token.
    #[error("login response did not include an access token")]
    MissingToken,
}

impl ApiError {
    /// Build a status error from a failed response body.
    #[must_use]
    pub fn from_status(status: StatusCode, path: impl Into<String>, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.summary())
            .or_else(|| {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        Self::Status {
            status,
            path: path.into(),
            message,
        }
    }

    /// HTTP status carried by the error, when the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the backend rejected the stored credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API base URL could not be parsed.
    #[error("invalid API URL '{value}': {source}")]
    InvalidUrl {
        /// Raw value supplied by the caller.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The API base URL is not an http(s) URL.
    #[error("API URL '{value}' must use http or https")]
    UnsupportedScheme {
        /// Raw value supplied by the caller.
        value: String,
    },
    /// The timeout is not a positive number of seconds.
    #[error("invalid HTTP timeout '{value}': expected a positive number of seconds")]
    InvalidTimeout {
        /// Raw value supplied by the caller.
        value: String,
    },
}

/// Failure reading or writing persisted client state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("failed to access state file '{}': {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The state could not be serialised.
    #[error("failed to encode '{namespace}' state: {source}")]
    Serialize {
        /// Storage namespace.
        namespace: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// The stored document could not be parsed.
    #[error("failed to decode '{namespace}' state: {source}")]
    Deserialize {
        /// Storage namespace.
        namespace: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_backend_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            "/auth/login",
            br#"{"statusCode":401,"message":"Invalid credentials"}"#,
        );
        assert!(err.is_unauthorized());
        assert_eq!(
            err.to_string(),
            "Invalid credentials (status 401 Unauthorized)"
        );
    }

    #[test]
    fn status_error_falls_back_to_text_then_status() {
        let text = ApiError::from_status(StatusCode::BAD_GATEWAY, "/products", b"  upstream down \n");
        assert!(matches!(&text, ApiError::Status { message, .. } if message == "upstream down"));

        let empty = ApiError::from_status(StatusCode::NOT_FOUND, "/products/9", b"");
        assert!(
            matches!(&empty, ApiError::Status { message, .. } if message == "request failed with status 404")
        );
        assert_eq!(empty.status(), Some(StatusCode::NOT_FOUND));
        assert!(!empty.is_unauthorized());
    }

    #[test]
    fn non_http_errors_have_no_status() {
        assert_eq!(ApiError::MissingToken.status(), None);
    }
}
