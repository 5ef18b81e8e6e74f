//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation name is neither built in nor registered.
    #[error("Method {0} does not exist.")]
    UnknownOperation(String),

    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the server, or a generic one.
        message: String,
    },

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration document could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// An endpoint received fewer arguments than it needs.
    #[error("expected {expected} arguments, got {got}")]
    MissingArgument {
        /// Arguments the endpoint consumes.
        expected: usize,
        /// Arguments supplied.
        got: usize,
    },

    /// The streaming connection failed mid-read.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Check if this is a dispatch miss.
    pub fn is_unknown_operation(&self) -> bool {
        matches!(self, Error::UnknownOperation(_))
    }

    /// Check if this came from the transport (network failure or non-2xx).
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Api { .. } | Error::Stream(_))
    }

    /// Check if the response body could not be decoded.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Error::Json(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { status: 401 | 403, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by Mastodon-compatible servers.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorResponse {
    pub(crate) fn into_message(self) -> String {
        match self.error_description {
            Some(description) => format!("{}: {}", self.error, description),
            None => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operation_message() {
        let err = Error::UnknownOperation("test".to_string());
        assert_eq!(err.to_string(), "Method test does not exist.");
        assert!(err.is_unknown_operation());
        assert!(!err.is_transport_error());
    }

    #[test]
    fn test_status_predicates() {
        let api = |status| Error::Api {
            status,
            message: String::new(),
        };
        assert!(api(404).is_not_found());
        assert!(api(401).is_auth_error());
        assert!(api(403).is_auth_error());
        assert!(api(429).is_rate_limited());
        assert!(api(503).is_server_error());
        assert!(!api(400).is_server_error());
        assert!(api(500).is_transport_error());
    }

    #[test]
    fn test_error_response_message() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"expired"}"#)
                .unwrap();
        assert_eq!(body.into_message(), "invalid_grant: expired");

        let body: ErrorResponse = serde_json::from_str(r#"{"error":"Record not found"}"#).unwrap();
        assert_eq!(body.into_message(), "Record not found");
    }
}
