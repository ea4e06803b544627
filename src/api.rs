//! HTTP API for the chat client
//!
//! JSON + SSE surface only; static hosting stays with the frontend tooling.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::runtime::ChatHandle;
use crate::session::SessionStore;
use crate::store::ConversationStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: ConversationStore,
    pub chat: ChatHandle,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(store: ConversationStore, chat: ChatHandle, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            chat,
            sessions,
        }
    }
}
