//! Accounts API.

use crate::client::MastodonClient;
use crate::endpoint::builtin;
use crate::error::Result;
use crate::types::{Response, StatusesQuery};

impl MastodonClient {
    /// Get the account the token belongs to.
    pub async fn verify_credentials(&self) -> Result<Response> {
        self.invoke(&builtin::verify_credentials(), Vec::new()).await
    }

    /// List statuses posted by an account, newest first.
    pub async fn statuses(&self, account_id: &str) -> Result<Response> {
        self.statuses_with_query(account_id, &StatusesQuery::default())
            .await
    }

    /// List statuses posted by an account with paging parameters.
    ///
    /// An unset `limit` falls back to the default of 40.
    pub async fn statuses_with_query(
        &self,
        account_id: &str,
        query: &StatusesQuery,
    ) -> Result<Response> {
        let query = serde_json::to_value(query)?;
        self.invoke(&builtin::statuses(), vec![account_id.into(), query])
            .await
    }
}
