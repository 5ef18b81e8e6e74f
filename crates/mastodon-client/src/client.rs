//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::endpoint::{Endpoint, builtin};
use crate::error::{Error, ErrorResponse, Result};
use crate::registry::{Operation, OperationRegistry};
use crate::types::{Params, RawResponse, Response};

/// Default timeout for one-shot requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Mastodon API client.
///
/// Cheap to clone; clones share the transport, config and registry.
///
/// # Example
///
/// ```no_run
/// use mastodon_client::MastodonClient;
///
/// # async fn example() -> mastodon_client::Result<()> {
/// let client = MastodonClient::builder()
///     .domain("https://mastodon.example")
///     .token("secret")
///     .build()?;
///
/// let account = client.verify_credentials().await?;
/// println!("{}", account["acct"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MastodonClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Domain, prefix, version and token.
    pub(crate) config: Config,
    /// Request timeout for one-shot calls.
    pub(crate) timeout: Duration,
    /// Operations resolved after the built-ins.
    pub(crate) registry: Arc<OperationRegistry>,
}

impl MastodonClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for a domain with default settings.
    pub fn new(domain: impl Into<String>) -> Result<Self> {
        Self::builder().domain(domain).build()
    }

    /// Get the active configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the registry consulted by [`dispatch`](Self::dispatch).
    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.inner.registry
    }

    /// Return a client that authenticates with a different token.
    ///
    /// The transport and registry are shared with `self`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: self.inner.http.clone(),
                config: self.inner.config.clone().token(token),
                timeout: self.inner.timeout,
                registry: Arc::clone(&self.inner.registry),
            }),
        }
    }

    /// Build the full URL for an API path: domain, prefix, version, path.
    pub fn url(&self, path: &str) -> Result<Url> {
        let root = self.inner.config.api_root()?;
        Url::parse(&format!("{}{}", root, path)).map_err(Error::from)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Generic requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Perform one request against an API path.
    ///
    /// `options` become the query string for GET, DELETE and HEAD and the
    /// JSON body for everything else.
    pub async fn call(&self, method: Method, path: &str, options: &Params) -> Result<Response> {
        Ok(self.send(method, path, options).await?.into_body())
    }

    /// Like [`call`](Self::call), but keep the status and headers.
    ///
    /// Mastodon pages list endpoints through the `Link` header and reports
    /// rate limits in `X-RateLimit-*` headers; both are only visible here.
    pub async fn send(&self, method: Method, path: &str, options: &Params) -> Result<RawResponse> {
        let options = (!options.is_empty()).then_some(options);
        self.execute(method, path, options).await
    }

    /// Make a GET request with query parameters.
    pub async fn get<Q>(&self, path: &str, query: &Q) -> Result<Response>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.execute(Method::GET, path, Some(query)).await?;
        Ok(response.into_body())
    }

    /// Make a POST request with a JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Ok(response.into_body())
    }

    /// Substitute arguments into an endpoint and perform the request.
    pub async fn invoke(&self, endpoint: &Endpoint, args: Vec<Value>) -> Result<Response> {
        let (path, options) = endpoint.build(&args)?;
        self.call(endpoint.method().clone(), &path, &options).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Run an operation by name.
    ///
    /// Built-in operations are resolved first, then the registry. A name
    /// found in neither fails with [`Error::UnknownOperation`].
    pub async fn dispatch(&self, name: &str, args: Vec<Value>) -> Result<Response> {
        if let Some(endpoint) = builtin::lookup(name) {
            debug!(operation = name, "dispatching built-in operation");
            return self.invoke(&endpoint, args).await;
        }

        let operation = self
            .inner
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;

        debug!(operation = name, "dispatching registered operation");
        operation.invoke(self.clone(), args).await
    }

    /// Register an operation in this client's registry.
    pub fn register<O: Operation + 'static>(&self, name: impl Into<String>, operation: O) {
        self.inner.registry.register(name, operation);
    }

    /// Register an async closure in this client's registry.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(MastodonClient, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Response>> + Send + 'static,
    {
        self.inner.registry.register_fn(name, f);
    }

    /// Check if this client's registry has an operation.
    pub fn has_registered(&self, name: &str) -> bool {
        self.inner.registry.has_registered(name)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    async fn execute<O>(
        &self,
        method: Method,
        path: &str,
        options: Option<&O>,
    ) -> Result<RawResponse>
    where
        O: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        debug!(%method, %url, "sending request");

        let sends_query = [Method::GET, Method::DELETE, Method::HEAD].contains(&method);
        let mut request = self
            .inner
            .http
            .request(method, url)
            .timeout(self.inner.timeout);

        if let Some(options) = options {
            request = if sends_query {
                request.query(options)
            } else {
                request.json(options)
            };
        }

        let response = self.authorize(request).send().await?;
        self.handle_response(response).await
    }

    /// Open a GET to a full streaming URL (returns the response directly).
    ///
    /// No timeout is applied; the connection stays open until the server or
    /// the transport closes it.
    pub(crate) async fn open_stream(&self, url: &str) -> Result<reqwest::Response> {
        let url = Url::parse(url)?;
        debug!(%url, "opening stream");

        let request = self
            .inner
            .http
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"));
        let response = self.authorize(request).send().await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(response)
    }

    /// Attach the bearer token if a non-empty one is configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.config.token.as_deref() {
            Some(token) if !token.is_empty() => request.bearer_auth(token),
            _ => request,
        }
    }

    /// Handle a response, decoding the body or extracting the error.
    async fn handle_response(&self, response: reqwest::Response) -> Result<RawResponse> {
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(RawResponse {
            status,
            headers,
            body: serde_json::from_slice(&body)?,
        })
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        // Try to parse error response
        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.into_message(),
            Err(_) => format!("HTTP {}", status),
        };

        Error::Api { status, message }
    }
}

impl std::fmt::Debug for MastodonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MastodonClient")
            .field("config", &self.inner.config)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Builder for creating a MastodonClient.
#[derive(Debug)]
pub struct ClientBuilder {
    config: Config,
    timeout: Duration,
    user_agent: Option<String>,
    http: Option<reqwest::Client>,
    registry: Option<Arc<OperationRegistry>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            http: None,
            registry: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the server domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config = self.config.domain(domain);
        self
    }

    /// Set the API path prefix.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.config = self.config.api_base(api_base);
        self
    }

    /// Set the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config = self.config.api_version(api_version);
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.token(token);
        self
    }

    /// Set the timeout for one-shot requests. Streams are never timed out.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent. Ignored when a custom HTTP client is supplied.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use a pre-built HTTP client as the transport.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Resolve registered operations against this registry instead of the
    /// process-wide one.
    pub fn registry(mut self, registry: Arc<OperationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MastodonClient> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("mastodon-client/{}", env!("CARGO_PKG_VERSION")));
                reqwest::Client::builder().user_agent(user_agent).build()?
            }
        };

        let registry = self.registry.unwrap_or_else(OperationRegistry::global);

        Ok(MastodonClient {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                timeout: self.timeout,
                registry,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MastodonClient {
        ClientBuilder::new()
            .domain("https://example.com")
            .registry(Arc::new(OperationRegistry::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = ClientBuilder::new().build().unwrap();
        assert_eq!(client.config(), &Config::default());
        assert!(Arc::ptr_eq(client.registry(), &OperationRegistry::global()));
    }

    #[test]
    fn test_url_building() {
        let url = client().url("/statuses/1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v1/statuses/1");

        let url = client().url("/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v1/");
    }

    #[test]
    fn test_url_uses_prefix_and_version() {
        let client = ClientBuilder::new()
            .domain("https://example.com")
            .api_base("/api/")
            .api_version("v2")
            .build()
            .unwrap();

        let url = client.url("/search").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v2/search");
    }

    #[test]
    fn test_url_requires_domain() {
        let client = ClientBuilder::new().build().unwrap();
        assert!(matches!(client.url("/"), Err(Error::Config(_))));
    }

    #[test]
    fn test_url_rejects_garbage_domain() {
        let client = ClientBuilder::new().domain("not a url").build().unwrap();
        assert!(matches!(client.url("/"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_with_token_shares_registry() {
        let client = client();
        let authed = client.with_token("secret");

        assert_eq!(client.config().token, None);
        assert_eq!(authed.config().token.as_deref(), Some("secret"));
        assert!(Arc::ptr_eq(client.registry(), authed.registry()));
    }

    #[test]
    fn test_register_on_client() {
        let client = client();
        assert!(!client.has_registered("instance"));
        client.register("instance", Endpoint::get("/instance"));
        assert!(client.has_registered("instance"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_operation() {
        let err = client().dispatch("test", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(ref name) if name == "test"));
        assert!(err.to_string().ends_with("does not exist."));
    }

    #[tokio::test]
    async fn test_dispatch_builtin_checks_arguments_before_sending() {
        let err = client().dispatch("status", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::MissingArgument { expected: 1, got: 0 }));
    }

    #[tokio::test]
    async fn test_dispatch_registered_closure() {
        let client = client();
        client.register_fn("echo", |_client, args| async move {
            Ok::<_, Error>(Value::Array(args))
        });

        let response = client
            .dispatch("echo", vec![Value::from("a"), Value::from(1)])
            .await
            .unwrap();
        assert_eq!(response, serde_json::json!(["a", 1]));
    }
}
