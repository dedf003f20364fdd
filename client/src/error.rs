use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Status(u16),

    #[error("Response carried no body stream")]
    MissingStream,

    #[error("No data received from the relay within {0:?}")]
    Timeout(Duration),

    // ── Store errors ─────────────────────────────────────────────────────────
    #[error("Conversation '{id}' not found")]
    ConversationNotFound { id: String },

    #[error("Message '{id}' not found")]
    MessageNotFound { id: String },

    #[error("Message '{id}' was sent by the user and cannot be edited")]
    ImmutableMessage { id: String },

    #[error("A reply is already streaming into conversation '{id}'")]
    SendInProgress { id: String },
}

impl ClientError {
    /// True when the target conversation disappeared, i.e. the send was
    /// cancelled by deleting it.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ClientError::ConversationNotFound { .. })
    }
}
