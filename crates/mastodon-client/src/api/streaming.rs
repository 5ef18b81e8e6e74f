//! Streaming API.

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::client::MastodonClient;
use crate::error::Result;
use crate::stream::decode_events;
use crate::types::StreamEvent;

impl MastodonClient {
    /// Open a streaming URL and return its events as they arrive.
    ///
    /// `url` is the full URL, e.g.
    /// `https://mastodon.example/api/v1/streaming/public`. The stream ends
    /// when the server closes the connection; a transport failure is yielded
    /// once as an error and ends it too.
    ///
    /// The returned stream owns its connection and borrows neither the client
    /// nor `url`, so it can be moved into a spawned task.
    pub async fn events(
        &self,
        url: &str,
    ) -> Result<impl Stream<Item = Result<StreamEvent>> + Send + use<>> {
        let response = self.open_stream(url).await?;
        Ok(decode_events(Box::pin(response.bytes_stream())))
    }

    /// Open a streaming URL and call `handler` for every event.
    ///
    /// Returns `Ok(())` once the connection closes. Nothing is retried; a
    /// caller that wants to stay connected calls this again.
    pub async fn streaming<F>(&self, url: &str, mut handler: F) -> Result<()>
    where
        F: FnMut(StreamEvent),
    {
        let events = self.events(url).await?;
        let mut events = std::pin::pin!(events);

        let mut delivered: u64 = 0;
        while let Some(event) = events.next().await {
            handler(event?);
            delivered += 1;
        }

        debug!(url, delivered, "stream closed");
        Ok(())
    }
}
