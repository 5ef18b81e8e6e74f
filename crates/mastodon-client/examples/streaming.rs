//! Print the public timeline as it arrives.
//!
//! ```sh
//! MASTODON_TOKEN=... \
//! MASTODON_STREAMING_URL=https://mastodon.example/api/v1/streaming/public \
//! cargo run --example streaming
//! ```

use mastodon_client::{MastodonClient, Result};

/// Drop anything between `<` and `>`.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mastodon_client=debug")),
        )
        .init();

    let url = std::env::var("MASTODON_STREAMING_URL").unwrap_or_default();

    let mut builder = MastodonClient::builder();
    if let Ok(token) = std::env::var("MASTODON_TOKEN") {
        builder = builder.token(token);
    }
    let client = builder.build()?;

    client
        .streaming(&url, |event| {
            // event: update | notification | delete
            if event.event != "update" {
                return;
            }
            match event.json::<serde_json::Value>() {
                Ok(status) => {
                    let acct = status["account"]["acct"].as_str().unwrap_or_default();
                    let content = status["content"].as_str().unwrap_or_default();
                    println!("{}", strip_tags(acct));
                    println!("{}\n", strip_tags(content));
                }
                Err(e) => eprintln!("skipping malformed update: {e}"),
            }
        })
        .await
}
