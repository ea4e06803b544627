//! Chat state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Canonical message texts
// ============================================================================

/// Seed message for a fresh conversation
pub const WELCOME_TEXT: &str =
    "Welcome to the LLM Browser! Type in your request prefixed by '!objective' to get started!";

/// Transient placeholder appended while a service call is in flight
pub const TYPING_TEXT: &str = "is typing";

/// Response to the `help` directive
pub const HELP_TEXT: &str =
    "**Available commands:** !confirm, !help, !restart, !objective, !suggest.";

/// Response to an unrecognized directive
pub const UNRECOGNIZED_TEXT: &str = "**Command not recognized!**";

/// Prefix for suggestion messages produced by the command service
pub const RECOMMEND_PREFIX: &str = "**Recommend Command:** ";

// ============================================================================
// Messages
// ============================================================================

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    System,
}

/// A single chat line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub is_incoming: bool,
    /// Creation time; monotonically non-decreasing across the sequence in
    /// expectation (not strictly enforced)
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A message before the store stamps it with an id and timestamp
///
/// The transition layer only ever produces drafts, keeping it free of clock
/// and id-generation side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub sender: Sender,
    pub text: String,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl MessageDraft {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::System,
            text: text.into(),
            image: None,
            url: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            image: None,
            url: None,
        }
    }

    pub fn with_attachments(mut self, image: Option<String>, url: Option<String>) -> Self {
        self.image = image;
        self.url = url;
        self
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Persisted subset of the chat session
///
/// Threaded through the transition function as a value; the session store
/// adapter owns serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current user-declared goal, set by the `objective` directive
    pub objective: Option<String>,
    /// Name of the last command issued to the command service
    pub previous_command: Option<String>,
}

// ============================================================================
// Interpreter state
// ============================================================================

/// Interpreter phase
///
/// `generation` counts service calls issued so far; a service result carrying
/// anything other than the current generation is stale and is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatState {
    /// Ready for input, no call outstanding
    Idle { generation: u64 },
    /// A service call is in flight
    AwaitingService { generation: u64 },
}

impl Default for ChatState {
    fn default() -> Self {
        ChatState::Idle { generation: 0 }
    }
}

impl ChatState {
    pub fn generation(&self) -> u64 {
        match self {
            ChatState::Idle { generation } | ChatState::AwaitingService { generation } => {
                *generation
            }
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, ChatState::AwaitingService { .. })
    }
}
