//! Statuses API.

use serde_json::Value;

use crate::client::MastodonClient;
use crate::endpoint::builtin;
use crate::error::Result;
use crate::types::{Params, Response};

impl MastodonClient {
    /// Get a status by ID.
    pub async fn status(&self, id: &str) -> Result<Response> {
        self.invoke(&builtin::status(), vec![id.into()]).await
    }

    /// Post a status with just text (convenience method).
    pub async fn create_status(&self, text: &str) -> Result<Response> {
        self.create_status_with(text, Params::new()).await
    }

    /// Post a status with extra parameters such as `visibility`,
    /// `in_reply_to_id` or `spoiler_text`.
    pub async fn create_status_with(&self, text: &str, options: Params) -> Result<Response> {
        self.invoke(
            &builtin::create_status(),
            vec![text.into(), Value::Object(options)],
        )
        .await
    }
}
