//! Endpoint descriptors and the built-in operation table.
//!
//! An [`Endpoint`] is a verb, a path template with positional `{}`
//! placeholders, and an ordered list of named parameters. Positional
//! arguments fill the placeholders first, then the named parameters. One
//! extra argument holding a JSON object is merged into the request options.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::client::MastodonClient;
use crate::error::{Error, Result};
use crate::registry::Operation;
use crate::types::{Params, Response};

const PLACEHOLDER: &str = "{}";

/// Verb, path template and parameter rules for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    method: Method,
    path: String,
    params: Vec<String>,
    defaults: Params,
}

impl Endpoint {
    /// Create an endpoint for any HTTP method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            defaults: Params::new(),
        }
    }

    /// Create a GET endpoint.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST endpoint.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Name the parameters that consume arguments after the placeholders.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Add an option sent unless an argument overrides it.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template, relative to the API root.
    pub fn path_template(&self) -> &str {
        &self.path
    }

    /// Named parameters in argument order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Number of `{}` placeholders in the path template.
    pub fn placeholder_count(&self) -> usize {
        self.path.matches(PLACEHOLDER).count()
    }

    /// Number of positional arguments the endpoint requires.
    pub fn arg_count(&self) -> usize {
        self.placeholder_count() + self.params.len()
    }

    /// Substitute arguments into a concrete path and its options.
    pub fn build(&self, args: &[Value]) -> Result<(String, Params)> {
        let expected = self.arg_count();
        if args.len() < expected {
            return Err(Error::MissingArgument {
                expected,
                got: args.len(),
            });
        }

        let placeholders = self.placeholder_count();
        let mut segments = self.path.split(PLACEHOLDER);
        let mut path = String::with_capacity(self.path.len());
        if let Some(head) = segments.next() {
            path.push_str(head);
        }
        for (segment, arg) in segments.zip(args) {
            path.push_str(&path_value(arg));
            path.push_str(segment);
        }

        let rest = &args[placeholders..];
        let mut options = self.defaults.clone();
        for (name, value) in self.params.iter().zip(rest) {
            options.insert(name.clone(), value.clone());
        }
        if let Some(Value::Object(extra)) = rest.get(self.params.len()) {
            options.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok((path, options))
    }
}

#[async_trait]
impl Operation for Endpoint {
    async fn invoke(&self, client: MastodonClient, args: Vec<Value>) -> Result<Response> {
        client.invoke(self, args).await
    }
}

/// Strings are inserted verbatim; everything else as JSON text.
fn path_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Built-in operations, resolved before any registered operation.
pub mod builtin {
    use super::Endpoint;

    /// Default page size for account status listings.
    pub const DEFAULT_STATUSES_LIMIT: u32 = 40;

    /// Register an application: `client_name`, `redirect_uris`, `scopes`.
    pub fn create_app() -> Endpoint {
        Endpoint::post("/apps").with_params(["client_name", "redirect_uris", "scopes"])
    }

    /// The authenticated account.
    pub fn verify_credentials() -> Endpoint {
        Endpoint::get("/accounts/verify_credentials")
    }

    /// Statuses posted by an account: `account_id`.
    pub fn statuses() -> Endpoint {
        Endpoint::get("/accounts/{}/statuses").with_default("limit", DEFAULT_STATUSES_LIMIT)
    }

    /// A single status: `id`.
    pub fn status() -> Endpoint {
        Endpoint::get("/statuses/{}")
    }

    /// Post a new status: `status`.
    pub fn create_status() -> Endpoint {
        Endpoint::post("/statuses").with_params(["status"])
    }

    /// Resolve a built-in by its snake_case or camelCase name.
    pub fn lookup(name: &str) -> Option<Endpoint> {
        match name {
            "create_app" | "createApp" => Some(create_app()),
            "verify_credentials" | "verifyCredentials" => Some(verify_credentials()),
            "statuses" => Some(statuses()),
            "status" => Some(status()),
            "create_status" | "createStatus" => Some(create_status()),
            _ => None,
        }
    }
}
