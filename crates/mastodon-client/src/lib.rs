//! REST and streaming client for Mastodon-compatible servers.
//!
//! # Example
//!
//! ```no_run
//! use mastodon_client::{MastodonClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = MastodonClient::builder()
//!     .domain("https://mastodon.example")
//!     .token("secret")
//!     .build()?;
//!
//! // Typed built-in operations
//! let account = client.verify_credentials().await?;
//! let statuses = client.statuses(account["id"].as_str().unwrap_or_default()).await?;
//!
//! // Anything else, by path
//! let instance = client.get("/instance", &()).await?;
//!
//! // Or by name, once registered
//! client.register("instance", mastodon_client::Endpoint::get("/instance"));
//! let instance = client.dispatch("instance", Vec::new()).await?;
//!
//! // Follow the public timeline until the server hangs up
//! client
//!     .streaming("https://mastodon.example/api/v1/streaming/public", |event| {
//!         if event.event == "update" {
//!             println!("{}", event.data);
//!         }
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Dispatch
//!
//! [`MastodonClient::dispatch`] resolves a name against the built-in
//! operations (`create_app`, `verify_credentials`, `statuses`, `status`,
//! `create_status`) and then against the client's [`OperationRegistry`].
//! Unknown names fail with [`Error::UnknownOperation`].
//!
//! # Streaming
//!
//! [`MastodonClient::streaming`] pushes each framed [`StreamEvent`] into a
//! callback; [`MastodonClient::events`] returns the same events as a
//! `Stream`. The framing itself lives in [`stream`] and works on any byte
//! stream.

mod api;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod registry;
pub mod stream;
pub mod types;

pub use client::{ClientBuilder, MastodonClient};
pub use config::Config;
pub use endpoint::{Endpoint, builtin};
pub use error::{Error, Result};
pub use registry::{FnOperation, Operation, OperationRegistry};
pub use reqwest::Method;
pub use stream::{EventFramer, LineBuffer, decode_events};
pub use types::*;
