//! Typed operations, grouped by resource.
//!
//! Each one is a thin wrapper over a built-in [`Endpoint`](crate::Endpoint),
//! so calling it is equivalent to [`dispatch`](crate::MastodonClient::dispatch)
//! with the same arguments.

mod accounts;
mod apps;
mod statuses;
mod streaming;
