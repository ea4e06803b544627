//! Mock implementations for testing
//!
//! These mocks enable runtime tests without real I/O.

use crate::chat::state::{Message, SessionState};
use crate::service::{CommandService, ServiceCall, ServiceError, Suggestion};
use crate::session::{SessionResult, SessionStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Command Service
// ============================================================================

enum QueuedResponse {
    Ready(Result<Option<Suggestion>, ServiceError>),
    /// Held back until the associated `Notify` fires
    Gated(Arc<Notify>, Option<Suggestion>),
}

/// Mock command service that returns queued responses
pub struct MockCommandService {
    responses: Mutex<VecDeque<QueuedResponse>>,
    /// Record of all calls made
    calls: Mutex<Vec<ServiceCall>>,
}

impl MockCommandService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, outcome: Option<Suggestion>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(QueuedResponse::Ready(Ok(outcome)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ServiceError) {
        self.responses
            .lock()
            .unwrap()
            .push_back(QueuedResponse::Ready(Err(error)));
    }

    /// Queue a response that resolves only once the returned notify fires
    pub fn gate_next_response(&self, outcome: Option<Suggestion>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.responses
            .lock()
            .unwrap()
            .push_back(QueuedResponse::Gated(gate.clone(), outcome));
        gate
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, call: ServiceCall) -> Result<Option<Suggestion>, ServiceError> {
        self.calls.lock().unwrap().push(call);
        let queued = self.responses.lock().unwrap().pop_front();
        match queued {
            Some(QueuedResponse::Ready(result)) => result,
            Some(QueuedResponse::Gated(gate, outcome)) => {
                gate.notified().await;
                Ok(outcome)
            }
            None => Err(ServiceError::network("No mock response queued")),
        }
    }
}

impl Default for MockCommandService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandService for MockCommandService {
    async fn confirm(&self) -> Result<Option<Suggestion>, ServiceError> {
        self.respond(ServiceCall::Confirm).await
    }

    async fn objective(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError> {
        self.respond(ServiceCall::Objective(objective.to_string()))
            .await
    }

    async fn suggest(&self, objective: &str) -> Result<Option<Suggestion>, ServiceError> {
        self.respond(ServiceCall::Suggest(objective.to_string()))
            .await
    }
}

// ============================================================================
// In-memory Session Store
// ============================================================================

/// Session store backed by plain memory
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
    conversation: Mutex<Option<Vec<Message>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            conversation: Mutex::new(None),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> SessionResult<SessionState> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &SessionState) -> SessionResult<()> {
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        *self.state.lock().unwrap() = SessionState::default();
        *self.conversation.lock().unwrap() = None;
        Ok(())
    }

    async fn save_conversation(&self, messages: &[Message]) -> SessionResult<()> {
        *self.conversation.lock().unwrap() = Some(messages.to_vec());
        Ok(())
    }

    async fn load_conversation(&self) -> SessionResult<Option<Vec<Message>>> {
        Ok(self.conversation.lock().unwrap().clone())
    }
}
