//! Terminal front end for the assistant chat, driving the same turn state
//! machine as the web view through the edge relay.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use acacia_edge::application::ports::ChatTransportError;
use acacia_edge::application::services::{
    ChatSession, ConversationDefaults, TurnOutcome, TurnState,
};
use acacia_edge::domain::{ChatMessage, Credentials, MessageRole};
use acacia_edge::infrastructure::http::EdgeChatClient;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    }
}

fn print_history(messages: &[ChatMessage]) {
    for message in messages {
        println!("{}> {}", label(message.role), message.content);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let edge_url = env_or("ACACIA_EDGE_URL", "http://localhost:3000");
    let credentials = Credentials::new(
        std::env::var("ACACIA_ACCESS_TOKEN").ok(),
        std::env::var("ACACIA_REFRESH_TOKEN").ok(),
    );
    let defaults = ConversationDefaults {
        project_id: env_or("ACACIA_PROJECT_ID", "1")
            .parse()
            .context("ACACIA_PROJECT_ID must be an integer")?,
        provider: env_or("ACACIA_PROVIDER", "openai"),
        model: env_or("ACACIA_MODEL", "gpt-4o-mini"),
    };

    let transport = Arc::new(
        EdgeChatClient::new(&edge_url, credentials).context("Failed to build HTTP client")?,
    );

    let mut session = match ChatSession::load_latest(Arc::clone(&transport), defaults.clone()).await
    {
        Ok(session) => session,
        Err(ChatTransportError::Unauthenticated(location)) => {
            anyhow::bail!("Session expired, log in again ({})", location);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not load the latest conversation");
            ChatSession::new(transport, defaults)
        }
    };

    if let Some(title) = session.title() {
        println!("== {} ==", title);
    }
    print_history(session.messages());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("you> ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            print!("you> ");
            std::io::stdout().flush()?;
            continue;
        }

        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        print!("assistant> ");
        std::io::stdout().flush()?;

        let mut printed = 0;
        let outcome = session
            .send(&line, &cancel, |message| {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(message.content[printed..].as_bytes());
                let _ = stdout.flush();
                printed = message.content.len();
            })
            .await;
        interrupt.abort();

        match outcome {
            Ok(TurnOutcome::Completed) => println!(),
            Ok(TurnOutcome::Errored { message }) => {
                println!();
                eprintln!("[error] {}", message);
            }
            Err(e) => eprintln!("[rejected] {}", e),
        }

        if session.state() == TurnState::Errored && session.conversation_id().is_none() {
            eprintln!("[error] no conversation could be created, try again");
        }

        print!("you> ");
        std::io::stdout().flush()?;
    }

    Ok(())
}
