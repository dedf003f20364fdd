use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Matches the relay's `MessageRole`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message as held by the local conversation store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub const DEFAULT_TITLE: &'static str = "New Chat";

    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: Self::DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire form of a message: role and content only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for OutboundMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Request body for the relay endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<OutboundMessage>,
}

// ── Streamed event payloads ───────────────────────────────────────────────────

/// One `data:` payload of the completion stream. Every level is optional on
/// the wire, so missing pieces decode to "no text".
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DeltaEvent {
    #[serde(default)]
    pub choices: Vec<DeltaChoice>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DeltaChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl DeltaEvent {
    /// Text carried by the first choice, if any.
    pub fn into_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }
}
