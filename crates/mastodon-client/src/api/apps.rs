//! Applications API.

use crate::client::MastodonClient;
use crate::endpoint::builtin;
use crate::error::Result;
use crate::types::Response;

impl MastodonClient {
    /// Register an application and obtain its client credentials.
    ///
    /// Does not need a token.
    pub async fn create_app(
        &self,
        client_name: &str,
        redirect_uris: &str,
        scopes: &str,
    ) -> Result<Response> {
        self.invoke(
            &builtin::create_app(),
            vec![client_name.into(), redirect_uris.into(), scopes.into()],
        )
        .await
    }
}
