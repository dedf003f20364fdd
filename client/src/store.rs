use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::error::ClientError;
use crate::models::{Conversation, Message, OutboundMessage, Role};

const EVENT_CAPACITY: usize = 256;
const TITLE_CHARS: usize = 30;

/// Change notifications published by [`ConversationStore`]. The rendering
/// layer subscribes to these instead of polling.
///
/// `MessageUpdated` carries the full content so a lagging subscriber can
/// resynchronise from any single event.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    ConversationCreated { conversation_id: String },
    ConversationDeleted { conversation_id: String },
    ActiveChanged { conversation_id: String },
    TitleChanged { conversation_id: String, title: String },
    MessageAppended { conversation_id: String, message: Message },
    MessageUpdated { conversation_id: String, message_id: String, content: String },
    PendingChanged { conversation_id: String, pending: bool },
    Notification { title: String, description: String },
}

#[derive(Default)]
struct StoreState {
    /// Newest first.
    conversations: Vec<Conversation>,
    active: Option<String>,
    /// Conversations with a send in flight.
    pending: HashSet<String>,
}

impl StoreState {
    fn find_mut(&mut self, id: &str) -> Result<&mut Conversation, ClientError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ClientError::ConversationNotFound { id: id.to_string() })
    }

    fn find(&self, id: &str) -> Result<&Conversation, ClientError> {
        self.conversations
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ClientError::ConversationNotFound { id: id.to_string() })
    }
}

/// In-memory conversation list shared between the UI and in-flight sends.
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct ConversationStore {
    state: Arc<RwLock<StoreState>>,
    events: broadcast::Sender<ChatEvent>,
}

impl ConversationStore {
    /// Creates a store holding one empty, active conversation.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let store = Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            events,
        };
        store.create_conversation();
        store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn conversations(&self) -> Vec<Conversation> {
        self.read().conversations.clone()
    }

    pub fn conversation(&self, id: &str) -> Option<Conversation> {
        self.read().find(id).ok().cloned()
    }

    pub fn active(&self) -> Option<String> {
        self.read().active.clone()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.read().pending.contains(id)
    }

    /// The transcript as sent to the relay: role and content only.
    pub fn outbound_messages(&self, id: &str) -> Result<Vec<OutboundMessage>, ClientError> {
        let state = self.read();
        let conversation = state.find(id)?;
        Ok(conversation.messages.iter().map(OutboundMessage::from).collect())
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Adds an empty conversation at the top of the list and makes it active.
    pub fn create_conversation(&self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        {
            let mut state = self.write();
            state.conversations.insert(0, conversation);
            state.active = Some(id.clone());
        }
        self.emit(ChatEvent::ConversationCreated {
            conversation_id: id.clone(),
        });
        self.emit(ChatEvent::ActiveChanged {
            conversation_id: id.clone(),
        });
        id
    }

    pub fn select(&self, id: &str) -> Result<(), ClientError> {
        {
            let mut state = self.write();
            state.find(id)?;
            state.active = Some(id.to_string());
        }
        self.emit(ChatEvent::ActiveChanged {
            conversation_id: id.to_string(),
        });
        Ok(())
    }

    /// Appends a message and returns its id. The first user message of a
    /// conversation also names it.
    pub fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<String, ClientError> {
        let message = Message::new(role, content);
        let id = message.id.clone();

        let title = {
            let mut state = self.write();
            let conversation = state.find_mut(conversation_id)?;
            let title = if conversation.messages.is_empty() && role == Role::User {
                conversation.title = derive_title(&message.content);
                Some(conversation.title.clone())
            } else {
                None
            };
            conversation.messages.push(message.clone());
            title
        };

        self.emit(ChatEvent::MessageAppended {
            conversation_id: conversation_id.to_string(),
            message,
        });
        if let Some(title) = title {
            self.emit(ChatEvent::TitleChanged {
                conversation_id: conversation_id.to_string(),
                title,
            });
        }
        Ok(id)
    }

    /// Replaces the content of one assistant message, addressed by id.
    pub fn update_message_content(
        &self,
        conversation_id: &str,
        message_id: &str,
        text: &str,
    ) -> Result<(), ClientError> {
        {
            let mut state = self.write();
            let conversation = state.find_mut(conversation_id)?;
            let message = conversation
                .messages
                .iter_mut()
                .find(|m| m.id == message_id)
                .ok_or_else(|| ClientError::MessageNotFound {
                    id: message_id.to_string(),
                })?;
            if message.role == Role::User {
                return Err(ClientError::ImmutableMessage {
                    id: message_id.to_string(),
                });
            }
            message.content.clear();
            message.content.push_str(text);
        }

        self.emit(ChatEvent::MessageUpdated {
            conversation_id: conversation_id.to_string(),
            message_id: message_id.to_string(),
            content: text.to_string(),
        });
        Ok(())
    }

    /// Removes a conversation. The list is never left empty, and a deleted
    /// active conversation hands focus to the first remaining one.
    pub fn delete_conversation(&self, id: &str) -> Result<(), ClientError> {
        self.read().find(id)?;

        if self.read().conversations.len() == 1 {
            self.create_conversation();
        }

        let new_active = {
            let mut state = self.write();
            state.conversations.retain(|c| c.id != id);
            if state.active.as_deref() == Some(id) {
                state.active = state.conversations.first().map(|c| c.id.clone());
                state.active.clone()
            } else {
                None
            }
        };

        self.emit(ChatEvent::ConversationDeleted {
            conversation_id: id.to_string(),
        });
        if let Some(conversation_id) = new_active {
            self.emit(ChatEvent::ActiveChanged { conversation_id });
        }
        Ok(())
    }

    /// Marks a conversation as having a send in flight. Only one send may
    /// target a conversation at a time; the mark is cleared when the returned
    /// guard drops.
    pub fn begin_send(&self, id: &str) -> Result<SendGuard, ClientError> {
        {
            let mut state = self.write();
            state.find(id)?;
            if !state.pending.insert(id.to_string()) {
                return Err(ClientError::SendInProgress { id: id.to_string() });
            }
        }
        self.emit(ChatEvent::PendingChanged {
            conversation_id: id.to_string(),
            pending: true,
        });
        Ok(SendGuard {
            store: self.clone(),
            conversation_id: id.to_string(),
        })
    }

    /// Publishes a user-visible notification.
    pub fn notify(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(ChatEvent::Notification {
            title: title.into(),
            description: description.into(),
        });
    }

    fn end_send(&self, id: &str) {
        let removed = self.write().pending.remove(id);
        if removed {
            self.emit(ChatEvent::PendingChanged {
                conversation_id: id.to_string(),
                pending: false,
            });
        }
    }

    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending-send marker for one conversation; dropping it clears the typing
/// indicator whatever the outcome of the send.
pub struct SendGuard {
    store: ConversationStore,
    conversation_id: String,
}

impl SendGuard {
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.store.end_send(&self.conversation_id);
    }
}

fn derive_title(text: &str) -> String {
    let head: String = text.chars().take(TITLE_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_new_store_has_one_active_conversation() {
        let store = ConversationStore::new();
        let conversations = store.conversations();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].title, "New Chat");
        assert_eq!(store.active(), Some(conversations[0].id.clone()));
    }

    #[test]
    fn test_create_conversation_goes_first_and_becomes_active() {
        let store = ConversationStore::new();
        let first = store.active().unwrap();
        let second = store.create_conversation();

        let ids: Vec<String> = store.conversations().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.clone(), first]);
        assert_eq!(store.active(), Some(second));
    }

    #[test]
    fn test_first_user_message_sets_title() {
        let store = ConversationStore::new();
        let id = store.active().unwrap();
        let question = "What are my fundamental rights under the Indian Constitution?";
        store.append_message(&id, Role::User, question).unwrap();
        store.append_message(&id, Role::User, "And duties?").unwrap();

        let conversation = store.conversation(&id).unwrap();
        assert_eq!(conversation.title, "What are my fundamental rights...");
        assert_eq!(conversation.messages.len(), 2);
    }

    #[test]
    fn test_short_title_still_gets_ellipsis() {
        let store = ConversationStore::new();
        let id = store.active().unwrap();
        store.append_message(&id, Role::User, "Bail?").unwrap();
        assert_eq!(store.conversation(&id).unwrap().title, "Bail?...");
    }

    #[test]
    fn test_update_targets_message_by_id() {
        let store = ConversationStore::new();
        let id = store.active().unwrap();
        store.append_message(&id, Role::User, "Q").unwrap();
        let first = store.append_message(&id, Role::Assistant, "").unwrap();
        store.append_message(&id, Role::User, "Q2").unwrap();

        store.update_message_content(&id, &first, "Answer one").unwrap();

        let messages = store.conversation(&id).unwrap().messages;
        assert_eq!(messages[1].content, "Answer one");
        assert_eq!(messages[2].content, "Q2");
    }

    #[test]
    fn test_user_messages_are_immutable() {
        let store = ConversationStore::new();
        let id = store.active().unwrap();
        let user = store.append_message(&id, Role::User, "Q").unwrap();
        let err = store.update_message_content(&id, &user, "edited").unwrap_err();
        assert!(matches!(err, ClientError::ImmutableMessage { .. }));
        assert_eq!(store.conversation(&id).unwrap().messages[0].content, "Q");
    }

    #[test]
    fn test_update_unknown_targets_fail() {
        let store = ConversationStore::new();
        let id = store.active().unwrap();
        assert!(matches!(
            store.update_message_content("missing", "m", "x"),
            Err(ClientError::ConversationNotFound { .. })
        ));
        assert!(matches!(
            store.update_message_content(&id, "missing", "x"),
            Err(ClientError::MessageNotFound { .. })
        ));
    }

    #[test]
    fn test_outbound_messages_strip_local_fields() {
        let store = ConversationStore::new();
        let id = store.active().unwrap();
        store.append_message(&id, Role::User, "Q").unwrap();
        store.append_message(&id, Role::Assistant, "A").unwrap();

        let json = serde_json::to_value(store.outbound_messages(&id).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "role": "user", "content": "Q" },
                { "role": "assistant", "content": "A" }
            ])
        );
    }

    #[test]
    fn test_deleting_last_conversation_creates_a_new_one() {
        let store = ConversationStore::new();
        let only = store.active().unwrap();
        store.delete_conversation(&only).unwrap();

        let conversations = store.conversations();
        assert_eq!(conversations.len(), 1);
        assert_ne!(conversations[0].id, only);
        assert_eq!(store.active(), Some(conversations[0].id.clone()));
    }

    #[test]
    fn test_deleting_active_conversation_moves_focus() {
        let store = ConversationStore::new();
        let older = store.active().unwrap();
        let newer = store.create_conversation();

        store.delete_conversation(&newer).unwrap();
        assert_eq!(store.active(), Some(older.clone()));

        let third = store.create_conversation();
        store.delete_conversation(&older).unwrap();
        assert_eq!(store.active(), Some(third));
    }

    #[test]
    fn test_delete_unknown_conversation_fails() {
        let store = ConversationStore::new();
        assert!(store.delete_conversation("nope").is_err());
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_one_send_per_conversation() {
        let store = ConversationStore::new();
        let a = store.active().unwrap();
        let b = store.create_conversation();

        let guard = store.begin_send(&a).unwrap();
        assert!(store.is_pending(&a));
        assert!(matches!(
            store.begin_send(&a),
            Err(ClientError::SendInProgress { .. })
        ));
        let other = store.begin_send(&b).unwrap();
        assert_eq!(other.conversation_id(), b);

        drop(guard);
        assert!(!store.is_pending(&a));
        assert!(store.begin_send(&a).is_ok());
    }

    #[test]
    fn test_events_are_published() {
        let store = ConversationStore::new();
        let mut rx = store.subscribe();
        let id = store.active().unwrap();

        let message_id = store.append_message(&id, Role::Assistant, "").unwrap();
        store.update_message_content(&id, &message_id, "Hi").unwrap();
        store.notify("Error", "Failed");

        let events = drain(&mut rx);
        assert!(matches!(
            &events[0],
            ChatEvent::MessageAppended { message, .. } if message.id == message_id
        ));
        assert_eq!(
            events[1],
            ChatEvent::MessageUpdated {
                conversation_id: id.clone(),
                message_id,
                content: "Hi".to_string(),
            }
        );
        assert_eq!(
            events[2],
            ChatEvent::Notification {
                title: "Error".to_string(),
                description: "Failed".to_string(),
            }
        );
    }
}
