//! Runtime for driving a chat session
//!
//! A single event loop owns the interpreter state and applies transitions
//! strictly sequentially; service calls run as detached tasks whose results
//! come back in as events.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;

use crate::chat::{Event, SessionState};
use crate::service::CommandService;
use crate::session::SessionStore;
use crate::store::ConversationStore;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handle for submitting input to a running chat
#[derive(Clone)]
pub struct ChatHandle {
    event_tx: mpsc::Sender<Event>,
}

impl ChatHandle {
    /// Enqueue one line of user input
    pub async fn submit(&self, text: String) -> Result<(), String> {
        self.event_tx
            .send(Event::UserInput { text })
            .await
            .map_err(|e| format!("Failed to submit input: {e}"))
    }
}

/// Start a chat runtime in the background and return its handle
pub fn spawn_chat<S, C>(
    store: ConversationStore,
    session_store: Arc<S>,
    service: Arc<C>,
    initial_session: SessionState,
) -> ChatHandle
where
    S: SessionStore + 'static,
    C: CommandService + ?Sized + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);

    let runtime = ChatRuntime::new(
        store,
        initial_session,
        session_store,
        service,
        event_rx,
        event_tx.clone(),
    );

    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!("Chat runtime finished");
    });

    ChatHandle { event_tx }
}
