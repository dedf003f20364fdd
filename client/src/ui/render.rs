use std::collections::HashMap;
use std::io::Write;

use legalai_client::{ChatEvent, Conversation, ConversationStore, Role};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Where a piece of rendered text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Transcript(String),
    Alert(String),
}

/// Turns store events into terminal output for the active conversation.
/// Streamed replies are printed incrementally: only the text not yet shown.
/// Progress is tracked per reply and dropped once the reply settles.
#[derive(Debug, Default)]
pub struct Renderer {
    shown: HashMap<String, usize>,
}

impl Renderer {
    pub fn render(&mut self, event: &ChatEvent, active: Option<&str>) -> Option<Output> {
        let is_active = |id: &str| active == Some(id);

        match event {
            ChatEvent::PendingChanged {
                conversation_id,
                pending: false,
            }
            | ChatEvent::ConversationDeleted { conversation_id } => {
                self.shown.remove(conversation_id);
            }
            _ => {}
        }

        match event {
            ChatEvent::MessageAppended {
                conversation_id,
                message,
            } if message.role == Role::Assistant && is_active(conversation_id.as_str()) => {
                self.shown.insert(conversation_id.clone(), 0);
                Some(Output::Transcript("\nLegalAI: ".to_string()))
            }
            ChatEvent::MessageUpdated {
                conversation_id,
                content,
                ..
            } if is_active(conversation_id.as_str()) => {
                let shown = self.shown.entry(conversation_id.clone()).or_insert(0);
                let fresh = content.get(*shown..).unwrap_or_default();
                *shown = content.len();
                (!fresh.is_empty()).then(|| Output::Transcript(fresh.to_string()))
            }
            ChatEvent::PendingChanged {
                conversation_id,
                pending: false,
            } if is_active(conversation_id.as_str()) => Some(Output::Transcript("\n".to_string())),
            ChatEvent::Notification { title, description } => {
                Some(Output::Alert(format!("{title}: {description}")))
            }
            _ => None,
        }
    }
}

/// Prints a whole conversation, e.g. after switching to it.
pub fn transcript(conversation: &Conversation) -> String {
    let mut out = format!("── {} ──\n", conversation.title);
    for message in &conversation.messages {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "LegalAI",
        };
        out.push_str(&format!("{speaker}: {}\n", message.content));
    }
    out
}

/// Render loop: runs until the store's event channel closes.
pub async fn run(store: ConversationStore, mut events: broadcast::Receiver<ChatEvent>) {
    let mut renderer = Renderer::default();
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Renderer skipped {skipped} events");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let active = store.active();
        match renderer.render(&event, active.as_deref()) {
            Some(Output::Transcript(text)) => {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
            Some(Output::Alert(text)) => eprintln!("{text}"),
            None => {}
        }
    }
}
