//! Pure state transition function
//!
//! Classification, directive dispatch, and message construction all happen
//! here with no I/O. The runtime executes the returned effects and feeds
//! service results back in as events.

use super::directive::{classify, Directive, Input};
use super::effect::Effect;
use super::event::Event;
use super::state::{
    ChatState, MessageDraft, SessionState, HELP_TEXT, RECOMMEND_PREFIX, TYPING_TEXT,
    UNRECOGNIZED_TEXT,
};
use crate::service::ServiceCall;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub new_session: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState, session: SessionState) -> Self {
        Self {
            new_state: state,
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function
///
/// Total over all inputs: every event maps to a result, and the same inputs
/// always produce the same outputs.
pub fn transition(state: &ChatState, session: &SessionState, event: Event) -> TransitionResult {
    match event {
        Event::UserInput { text } => dispatch(state, session, &text),

        Event::ServiceResult {
            generation,
            outcome,
        } => {
            // Drop anything that is not the result of the current in-flight
            // call: a superseded generation, or a result arriving while idle.
            if !state.is_awaiting() || generation != state.generation() {
                return TransitionResult::new(state.clone(), session.clone());
            }

            let idle = ChatState::Idle { generation };
            match outcome {
                Some(suggestion) => {
                    let draft = MessageDraft::system(format!(
                        "{RECOMMEND_PREFIX}{}",
                        suggestion.text
                    ))
                    .with_attachments(suggestion.image, suggestion.url);
                    TransitionResult::new(idle, session.clone())
                        .with_effect(Effect::Append(draft))
                        .with_effect(Effect::PersistConversation)
                }
                // No usable result: nothing is appended and the placeholder
                // stays as the last visible line.
                None => TransitionResult::new(idle, session.clone()),
            }
        }
    }
}

/// Classify one input line and apply the directive table
fn dispatch(state: &ChatState, session: &SessionState, text: &str) -> TransitionResult {
    match classify(text) {
        Input::Empty => begin_call(state, session, ServiceCall::Confirm),

        Input::Text(text) => TransitionResult::new(state.clone(), session.clone())
            .with_effect(Effect::append_user(text))
            .with_effect(Effect::PersistConversation),

        Input::Directive(directive) => match directive {
            // Full reset: store back to the single welcome message, session
            // cleared. The generation bump invalidates any in-flight call.
            Directive::Restart => {
                let generation = state.generation() + 1;
                TransitionResult::new(ChatState::Idle { generation }, SessionState::default())
                    .with_effect(Effect::Reset)
                    .with_effect(Effect::ClearSession)
            }

            Directive::Confirm => begin_call(state, session, ServiceCall::Confirm),

            Directive::Objective(objective) => {
                begin_call(state, session, ServiceCall::Objective(objective))
            }

            Directive::Suggest(objective) => {
                begin_call(state, session, ServiceCall::Suggest(objective))
            }

            Directive::Help => TransitionResult::new(state.clone(), session.clone())
                .with_effect(Effect::append_system(HELP_TEXT))
                .with_effect(Effect::PersistConversation),

            Directive::Unknown => TransitionResult::new(state.clone(), session.clone())
                .with_effect(Effect::append_system(UNRECOGNIZED_TEXT))
                .with_effect(Effect::PersistConversation),
        },
    }
}

/// Append the typing placeholder, record the command in session state, and
/// issue the service call under a fresh generation
fn begin_call(state: &ChatState, session: &SessionState, call: ServiceCall) -> TransitionResult {
    let generation = state.generation() + 1;

    let mut next = session.clone();
    if let ServiceCall::Objective(objective) = &call {
        next.objective = Some(objective.clone());
    }
    // Issuing a call records its name; for `objective` this also replaces the
    // command recorded before the objective changed.
    next.previous_command = Some(call.name().to_string());

    TransitionResult::new(ChatState::AwaitingService { generation }, next.clone())
        .with_effect(Effect::append_system(TYPING_TEXT))
        .with_effect(Effect::PersistConversation)
        .with_effect(Effect::PersistSession(next))
        .with_effect(Effect::CallService { generation, call })
}
