//! API request/response types

use crate::chat::{Message, SessionState};
use serde::{Deserialize, Serialize};

/// Request body for submitting a chat line
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Generic success acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Full conversation snapshot
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<Message>,
}

/// Persisted session state
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionState,
}

/// Error payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
