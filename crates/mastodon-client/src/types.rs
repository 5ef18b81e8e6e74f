//! Request and response types shared across the client.
//!
//! Responses are not given a schema here; callers index into the decoded
//! JSON or deserialize it into their own types.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A decoded JSON response body. Object keys keep the server's order.
pub type Response = serde_json::Value;

/// Request options: the query string for GET, the body for POST.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// A decoded body together with the status line and headers it came with.
///
/// Returned by [`MastodonClient::send`](crate::MastodonClient::send) for
/// callers that need paging (`Link`) or rate limit (`X-RateLimit-*`) headers.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status of a successful response.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded JSON body.
    pub body: Response,
}

impl RawResponse {
    /// Get a header as text. Missing and non-UTF-8 values give `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Drop the status and headers.
    pub fn into_body(self) -> Response {
        self.body
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statuses
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for listing an account's statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusesQuery {
    /// Maximum number of statuses to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Return results newer than this ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since_id: Option<String>,
    /// Return results older than this ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_id: Option<String>,
}

impl Default for StatusesQuery {
    fn default() -> Self {
        Self {
            limit: Some(crate::endpoint::builtin::DEFAULT_STATUSES_LIMIT),
            since_id: None,
            max_id: None,
        }
    }
}

impl StatusesQuery {
    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only return statuses newer than `id`.
    pub fn since(mut self, id: impl Into<String>) -> Self {
        self.since_id = Some(id.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming
// ─────────────────────────────────────────────────────────────────────────────

/// One event framed from a streaming response body.
///
/// `data` is the raw payload text, usually a JSON document. Decoding is left
/// to the caller, see [`StreamEvent::json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Event name, e.g. `update`, `notification` or `delete`.
    pub event: String,
    /// Raw payload.
    pub data: String,
}

impl StreamEvent {
    /// Create an event.
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// Decode the payload as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_str(&self.data)?)
    }
}
