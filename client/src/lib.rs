//! Streaming chat client for the LegalAI relay: an in-memory conversation
//! store, the event-stream decoder and the consumer that ties them together.

pub mod config;
pub mod consumer;
pub mod error;
pub mod models;
pub mod sse;
pub mod store;

pub use config::ClientConfig;
pub use consumer::{SendOutcome, StreamConsumer};
pub use error::ClientError;
pub use models::{Conversation, Message, Role};
pub use store::{ChatEvent, ConversationStore, SendGuard};
