//! Effects produced by state transitions

use crate::chat::state::{MessageDraft, SessionState};
use crate::service::ServiceCall;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the conversation store
    Append(MessageDraft),

    /// Reset the conversation store to the single welcome message
    Reset,

    /// Issue a call to the command service
    ///
    /// The result must come back as `Event::ServiceResult` carrying the same
    /// generation.
    CallService { generation: u64, call: ServiceCall },

    /// Persist the session state snapshot
    PersistSession(SessionState),

    /// Remove every persisted session key
    ClearSession,

    /// Persist the current conversation snapshot
    PersistConversation,
}

impl Effect {
    pub fn append_system(text: impl Into<String>) -> Self {
        Effect::Append(MessageDraft::system(text))
    }

    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::Append(MessageDraft::user(text))
    }
}
