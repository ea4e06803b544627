//! Conversation store
//!
//! Ordered, append-mostly sequence of messages for the lifetime of the
//! process. The only mutations are append and a full reset; every mutation is
//! broadcast to the rendering layer. Order is chronological and is the only
//! ordering guarantee.

use crate::chat::state::{Message, MessageDraft, Sender, WELCOME_TEXT};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Store mutations broadcast to subscribers
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Appended(Message),
    Reset(Message),
}

/// Thread-safe conversation store handle
#[derive(Clone)]
pub struct ConversationStore {
    messages: Arc<Mutex<Vec<Message>>>,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    /// Create a store seeded with the welcome message
    pub fn new() -> Self {
        Self::restore(vec![])
    }

    /// Create a store from a persisted snapshot, seeding the welcome message
    /// if the snapshot is empty
    pub fn restore(messages: Vec<Message>) -> Self {
        let messages = if messages.is_empty() {
            vec![stamp(MessageDraft::system(WELCOME_TEXT))]
        } else {
            messages
        };
        let (events_tx, _) = broadcast::channel(128);
        Self {
            messages: Arc::new(Mutex::new(messages)),
            events_tx,
        }
    }

    /// Append a message, stamping it with an id and timestamp
    pub fn append(&self, draft: MessageDraft) -> Message {
        let message = stamp(draft);
        self.messages.lock().unwrap().push(message.clone());
        let _ = self.events_tx.send(StoreEvent::Appended(message.clone()));
        message
    }

    /// Reset to the single welcome message
    pub fn reset(&self) -> Message {
        let welcome = stamp(MessageDraft::system(WELCOME_TEXT));
        *self.messages.lock().unwrap() = vec![welcome.clone()];
        let _ = self.events_tx.send(StoreEvent::Reset(welcome.clone()));
        welcome
    }

    /// Snapshot of the full message sequence
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// Subscribe to store mutations
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

fn stamp(draft: MessageDraft) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        is_incoming: draft.sender == Sender::System,
        sender: draft.sender,
        text: draft.text,
        timestamp: Utc::now(),
        image: draft.image,
        url: draft.url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_seeds_welcome() {
        let store = ConversationStore::new();
        let messages = store.snapshot();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, WELCOME_TEXT);
        assert_eq!(messages[0].sender, Sender::System);
        assert!(messages[0].is_incoming);
    }

    #[test]
    fn test_append_preserves_order() {
        let store = ConversationStore::new();
        store.append(MessageDraft::user("first"));
        store.append(MessageDraft::system("second"));

        let texts: Vec<_> = store.snapshot().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec![WELCOME_TEXT.to_string(), "first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_user_messages_are_outgoing() {
        let store = ConversationStore::new();
        let message = store.append(MessageDraft::user("hi"));
        assert!(!message.is_incoming);
    }

    #[test]
    fn test_reset_is_idempotent_and_length_independent() {
        let store = ConversationStore::new();
        for i in 0..10 {
            store.append(MessageDraft::user(format!("message {i}")));
        }
        assert_eq!(store.len(), 11);

        store.reset();
        assert_eq!(store.len(), 1);
        store.reset();
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].text, WELCOME_TEXT);
    }

    #[test]
    fn test_restore_from_snapshot() {
        let store = ConversationStore::new();
        store.append(MessageDraft::user("kept"));
        let snapshot = store.snapshot();

        let restored = ConversationStore::restore(snapshot.clone());
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn test_restore_empty_seeds_welcome() {
        let store = ConversationStore::restore(vec![]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_are_broadcast() {
        let store = ConversationStore::new();
        let mut rx = store.subscribe();

        store.append(MessageDraft::user("hello"));
        match rx.recv().await.unwrap() {
            StoreEvent::Appended(message) => assert_eq!(message.text, "hello"),
            StoreEvent::Reset(_) => panic!("expected append event"),
        }

        store.reset();
        match rx.recv().await.unwrap() {
            StoreEvent::Reset(welcome) => assert_eq!(welcome.text, WELCOME_TEXT),
            StoreEvent::Appended(_) => panic!("expected reset event"),
        }
    }
}
