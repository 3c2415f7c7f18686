//! Docs Chat terminal client
//!
//! Reads questions from stdin, one per line, and prints the answers.
//! Logs go to stderr as JSON so stdout stays readable.

use docs_chat::{ChatSurface, GatewayConfig, HttpGateway, LoggingGateway, Role, Turn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docs_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = GatewayConfig::from_env();
    // Stand-in for the site's auth context
    let user_id = std::env::var("DOCS_CHAT_USER_ID").ok();

    tracing::info!(
        url = %config.chat_url(),
        timeout_secs = ?config.request_timeout.map(|t| t.as_secs()),
        authenticated = user_id.is_some(),
        "Starting docs chat"
    );

    let http = HttpGateway::new(&config)?;
    let gateway = Arc::new(LoggingGateway::new(Arc::new(http)));
    let mut surface = ChatSurface::new(gateway);
    let mut store = surface.open();

    println!("Ask a question about the docs. /new starts over, /quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                surface.close();
                store = surface.open();
                println!("(new conversation)");
                continue;
            }
            _ => {}
        }

        let seen = store.snapshot().transcript().len();
        store.submit(&line, user_id.as_deref()).await;

        let conv = store.snapshot();
        for turn in conv.transcript().iter().skip(seen) {
            if turn.role == Role::Assistant {
                print_answer(turn);
            }
        }
    }

    surface.close();
    Ok(())
}

fn print_answer(turn: &Turn) {
    println!("\n{}", turn.content);
    if !turn.sources.is_empty() {
        println!("Sources: {}", turn.sources.join(", "));
    }
    println!();
}
