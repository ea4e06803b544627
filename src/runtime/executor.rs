//! Chat runtime executor

use crate::chat::{transition, ChatState, Effect, Event, SessionState};
use crate::service::{CommandService, ServiceCall};
use crate::session::SessionStore;
use crate::store::ConversationStore;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Generic chat runtime that can work with any session storage and command
/// service implementations
pub struct ChatRuntime<S, C>
where
    S: SessionStore + 'static,
    C: CommandService + ?Sized + 'static,
{
    state: ChatState,
    session: SessionState,
    store: ConversationStore,
    session_store: Arc<S>,
    service: Arc<C>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
}

impl<S, C> ChatRuntime<S, C>
where
    S: SessionStore + 'static,
    C: CommandService + ?Sized + 'static,
{
    pub fn new(
        store: ConversationStore,
        session: SessionState,
        session_store: Arc<S>,
        service: Arc<C>,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            state: ChatState::default(),
            session,
            store,
            session_store,
            service,
            event_rx,
            event_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting chat runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
        }

        tracing::info!("Chat runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        // Pure state transition
        let result = transition(&self.state, &self.session, event);

        self.state = result.new_state;
        self.session = result.new_session;

        for effect in result.effects {
            self.apply_effect(effect).await;
        }
    }

    async fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Append(draft) => {
                self.store.append(draft);
            }

            Effect::Reset => {
                self.store.reset();
            }

            Effect::PersistConversation => {
                let snapshot = self.store.snapshot();
                if let Err(e) = self.session_store.save_conversation(&snapshot).await {
                    tracing::warn!(error = %e, "Failed to persist conversation");
                }
            }

            Effect::PersistSession(session) => {
                if let Err(e) = self.session_store.save(&session).await {
                    tracing::warn!(error = %e, "Failed to persist session state");
                }
            }

            Effect::ClearSession => {
                if let Err(e) = self.session_store.clear().await {
                    tracing::warn!(error = %e, "Failed to clear session state");
                }
            }

            Effect::CallService { generation, call } => {
                self.spawn_service_call(generation, call);
            }
        }
    }

    /// Run a service call as a detached task so the event loop stays
    /// responsive; the result comes back as an event carrying the call's
    /// generation for the staleness check.
    fn spawn_service_call(&self, generation: u64, call: ServiceCall) {
        let service = self.service.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = match &call {
                ServiceCall::Confirm => service.confirm().await,
                ServiceCall::Objective(objective) => service.objective(objective).await,
                ServiceCall::Suggest(objective) => service.suggest(objective).await,
            };

            // Errors degrade to the empty result: no message is appended and
            // the placeholder stays visible.
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(
                        command = call.name(),
                        kind = e.kind.as_str(),
                        error = %e.message,
                        "Command service call failed"
                    );
                    None
                }
            };

            let _ = event_tx
                .send(Event::ServiceResult {
                    generation,
                    outcome,
                })
                .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::spawn_chat;
    use super::super::testing::{MemorySessionStore, MockCommandService};
    use super::*;
    use crate::chat::state::{RECOMMEND_PREFIX, TYPING_TEXT, WELCOME_TEXT};
    use crate::chat::Sender;
    use crate::service::{ServiceError, Suggestion};
    use std::time::Duration;

    fn harness() -> (
        ConversationStore,
        Arc<MemorySessionStore>,
        Arc<MockCommandService>,
    ) {
        (
            ConversationStore::new(),
            Arc::new(MemorySessionStore::new()),
            Arc::new(MockCommandService::new()),
        )
    }

    /// Poll until the condition holds, panicking after a deadline
    async fn wait_for(description: &str, mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("Timed out waiting for {description}");
    }

    #[tokio::test]
    async fn test_suggest_scenario_appends_placeholder_then_recommendation() {
        let (store, sessions, service) = harness();
        service.queue_response(Some(
            Suggestion::new("book flight").with_url("http://x"),
        ));

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );
        chat.submit("!suggest plan a trip".to_string()).await.unwrap();

        wait_for("recommendation to land", || store.len() == 3).await;

        let messages = store.snapshot();
        assert_eq!(messages[0].text, WELCOME_TEXT);
        assert_eq!(messages[1].text, TYPING_TEXT);
        assert_eq!(messages[2].text, format!("{RECOMMEND_PREFIX}book flight"));
        assert_eq!(messages[2].url.as_deref(), Some("http://x"));
        assert_eq!(messages[2].sender, Sender::System);

        assert_eq!(
            service.recorded_calls(),
            vec![ServiceCall::Suggest("plan a trip".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_input_issues_confirm_call() {
        let (store, sessions, service) = harness();
        service.queue_response(Some(Suggestion::new("scroll down")));

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );
        chat.submit(String::new()).await.unwrap();

        wait_for("confirm result to land", || store.len() == 3).await;
        assert_eq!(service.recorded_calls(), vec![ServiceCall::Confirm]);
    }

    #[tokio::test]
    async fn test_empty_result_leaves_placeholder_last() {
        let (store, sessions, service) = harness();
        service.queue_response(None);

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );
        chat.submit("!confirm".to_string()).await.unwrap();

        wait_for("call to resolve", || !service.recorded_calls().is_empty()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let messages = store.snapshot();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.last().unwrap().text, TYPING_TEXT);
    }

    #[tokio::test]
    async fn test_service_error_degrades_to_empty_result() {
        let (store, sessions, service) = harness();
        service.queue_error(ServiceError::server_error("backend down"));

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );
        chat.submit("!confirm".to_string()).await.unwrap();

        wait_for("call to resolve", || !service.recorded_calls().is_empty()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot().last().unwrap().text, TYPING_TEXT);
    }

    #[tokio::test]
    async fn test_objective_persists_session_fields() {
        let (store, sessions, service) = harness();
        service.queue_response(Some(Suggestion::new("goto page")));

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );
        chat.submit("!objective buy milk".to_string()).await.unwrap();

        wait_for("result to land", || store.len() == 3).await;

        let persisted = sessions.load().await.unwrap();
        assert_eq!(persisted.objective.as_deref(), Some("buy milk"));
        assert_eq!(persisted.previous_command.as_deref(), Some("objective"));
        assert_eq!(
            service.recorded_calls(),
            vec![ServiceCall::Objective("buy milk".to_string())]
        );
    }

    #[tokio::test]
    async fn test_restart_resets_store_and_clears_persistence() {
        let (store, sessions, service) = harness();
        service.queue_response(Some(Suggestion::new("goto page 1")));

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );

        chat.submit("hello".to_string()).await.unwrap();
        chat.submit("!objective explore".to_string()).await.unwrap();
        wait_for("objective result", || store.len() == 4).await;

        chat.submit("!restart".to_string()).await.unwrap();
        wait_for("store reset", || store.len() == 1).await;

        assert_eq!(store.snapshot()[0].text, WELCOME_TEXT);
        assert_eq!(sessions.load().await.unwrap(), SessionState::default());
        assert!(sessions.load_conversation().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_help_and_unknown_do_not_call_service() {
        let (store, sessions, service) = harness();

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );

        chat.submit("!help".to_string()).await.unwrap();
        chat.submit("!bogus".to_string()).await.unwrap();
        wait_for("both replies", || store.len() == 3).await;

        assert!(service.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_superseded_result_is_dropped() {
        let (store, sessions, service) = harness();
        // First call resolves only after being released; second resolves
        // immediately.
        let gate = service.gate_next_response(Some(Suggestion::new("stale")));
        service.queue_response(Some(Suggestion::new("fresh")));

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );

        chat.submit("!suggest first".to_string()).await.unwrap();
        wait_for("first call issued", || service.recorded_calls().len() == 1).await;

        chat.submit("!suggest second".to_string()).await.unwrap();
        wait_for("fresh result to land", || store.len() == 4).await;

        // Release the superseded call; its result must not be appended.
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let texts: Vec<_> = store.snapshot().into_iter().map(|m| m.text).collect();
        assert_eq!(
            texts,
            vec![
                WELCOME_TEXT.to_string(),
                TYPING_TEXT.to_string(),
                TYPING_TEXT.to_string(),
                format!("{RECOMMEND_PREFIX}fresh"),
            ]
        );
    }

    #[tokio::test]
    async fn test_conversation_snapshot_is_persisted() {
        let (store, sessions, service) = harness();

        let chat = spawn_chat(
            store.clone(),
            sessions.clone(),
            service.clone(),
            SessionState::default(),
        );

        chat.submit("remember this".to_string()).await.unwrap();
        wait_for("echo to land", || store.len() == 2).await;

        let persisted = sessions.load_conversation().await.unwrap().unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted[1].text, "remember this");
    }
}
