mod ui;

use std::sync::Arc;

use clap::Parser;
use legalai_client::{ClientConfig, ClientError, ConversationStore, StreamConsumer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::ui::commands::{Command, HELP};
use crate::ui::{render, DISCLAIMER, SUGGESTED_QUERIES};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with the transcript.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legalai_client=info,legalai=info".into()),
        )
        .init();

    let config = ClientConfig::parse();
    info!("Using relay at {}", config.relay_url);

    let store = ConversationStore::new();
    let consumer = Arc::new(StreamConsumer::new(&config, store.clone())?);
    let renderer = tokio::spawn(render::run(store.clone(), store.subscribe()));

    println!("Welcome to LegalAI. Type /help for commands.");
    println!("{DISCLAIMER}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::New => {
                store.create_conversation();
                println!("Started a new chat.");
            }
            Command::List => list_conversations(&store),
            Command::Switch(n) => switch_conversation(&store, n),
            Command::Delete => {
                if let Some(id) = store.active() {
                    store.delete_conversation(&id)?;
                    println!("Chat deleted.");
                }
            }
            Command::Suggest => {
                for (n, (title, query)) in SUGGESTED_QUERIES.iter().enumerate() {
                    println!("  /{} {title}: {query}", n + 1);
                }
            }
            Command::Unknown(input) => eprintln!("Unknown command {input}. Type /help."),
            Command::Send(text) => {
                let Some(id) = store.active() else {
                    continue;
                };
                let consumer = Arc::clone(&consumer);
                tokio::spawn(async move {
                    match consumer.send_message(&id, &text).await {
                        Ok(outcome) => debug!("Send on {id} settled: {outcome:?}"),
                        Err(ClientError::SendInProgress { .. }) => {
                            eprintln!("LegalAI is still answering in this chat, please wait.")
                        }
                        Err(err) => eprintln!("Could not send: {err}"),
                    }
                });
            }
        }
    }

    renderer.abort();
    Ok(())
}

fn list_conversations(store: &ConversationStore) {
    let active = store.active();
    for (n, conversation) in store.conversations().iter().enumerate() {
        let marker = if active.as_deref() == Some(conversation.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let typing = if store.is_pending(&conversation.id) {
            " (typing...)"
        } else {
            ""
        };
        println!("{marker} {}. {}{typing}", n + 1, conversation.title);
    }
}

fn switch_conversation(store: &ConversationStore, n: usize) {
    let conversations = store.conversations();
    let Some(conversation) = conversations.get(n - 1) else {
        eprintln!("No chat number {n}.");
        return;
    };
    if store.select(&conversation.id).is_ok() {
        print!("{}", render::transcript(conversation));
    }
}
