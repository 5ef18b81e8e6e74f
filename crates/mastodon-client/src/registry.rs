//! Runtime-registered operations.
//!
//! The client resolves an operation name against its built-in table first
//! and then against an [`OperationRegistry`]. Every client shares
//! [`OperationRegistry::global`] unless another registry is handed to
//! [`ClientBuilder::registry`](crate::ClientBuilder::registry), which keeps
//! tests and embedded clients isolated from each other.
//!
//! ```
//! use mastodon_client::{Endpoint, OperationRegistry};
//!
//! let registry = OperationRegistry::new();
//! registry.register("instance", Endpoint::get("/instance"));
//! assert!(registry.has_registered("instance"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::client::MastodonClient;
use crate::error::Result;
use crate::types::Response;

/// An operation the client can dispatch by name.
///
/// The handler receives a clone of the dispatching client, so it can issue
/// requests through [`MastodonClient::call`], [`MastodonClient::get`] and
/// [`MastodonClient::post`].
#[async_trait]
pub trait Operation: Send + Sync {
    /// Run the operation with positional arguments.
    async fn invoke(&self, client: MastodonClient, args: Vec<Value>) -> Result<Response>;
}

/// Adapter that turns an async closure into an [`Operation`].
pub struct FnOperation<F>(F);

impl<F> FnOperation<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Operation for FnOperation<F>
where
    F: Fn(MastodonClient, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    async fn invoke(&self, client: MastodonClient, args: Vec<Value>) -> Result<Response> {
        (self.0)(client, args).await
    }
}

/// Name-to-operation table safe to share between threads.
#[derive(Default)]
pub struct OperationRegistry {
    operations: RwLock<HashMap<String, Arc<dyn Operation>>>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by clients that were not given one.
    pub fn global() -> Arc<OperationRegistry> {
        static GLOBAL: OnceLock<Arc<OperationRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(OperationRegistry::new()))
            .clone()
    }

    /// Register an operation.
    ///
    /// If an operation with the same name already exists, it will be replaced.
    pub fn register<O: Operation + 'static>(&self, name: impl Into<String>, operation: O) {
        self.register_arc(name, Arc::new(operation));
    }

    /// Register an operation from an Arc.
    pub fn register_arc(&self, name: impl Into<String>, operation: Arc<dyn Operation>) {
        let name = name.into();
        tracing::debug!(operation = %name, "registering operation");
        self.operations.write().insert(name, operation);
    }

    /// Register an async closure.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(MastodonClient, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        self.register(name, FnOperation::new(f));
    }

    /// Check if an operation is registered.
    pub fn has_registered(&self, name: &str) -> bool {
        self.operations.read().contains_key(name)
    }

    /// Get an operation by name.
    ///
    /// The lock is released before the caller runs the operation.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.read().get(name).cloned()
    }

    /// Remove an operation, returning it if it was registered.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.write().remove(name)
    }

    /// Get all registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.read().is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.names())
            .finish()
    }
}
