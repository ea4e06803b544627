//! Property-based tests for the chat state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::effect::Effect;
use super::event::Event;
use super::state::{ChatState, SessionState, UNRECOGNIZED_TEXT};
use super::transition::transition;
use crate::service::Suggestion;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

const KNOWN_COMMANDS: [&str; 5] = ["restart", "confirm", "objective", "suggest", "help"];

fn arb_state() -> impl Strategy<Value = ChatState> {
    (0u64..100, any::<bool>()).prop_map(|(generation, awaiting)| {
        if awaiting {
            ChatState::AwaitingService { generation }
        } else {
            ChatState::Idle { generation }
        }
    })
}

fn arb_session() -> impl Strategy<Value = SessionState> {
    (
        proptest::option::of("[a-z ]{0,20}"),
        proptest::option::of("[a-z]{1,10}"),
    )
        .prop_map(|(objective, previous_command)| SessionState {
            objective,
            previous_command,
        })
}

fn arb_outcome() -> impl Strategy<Value = Option<Suggestion>> {
    proptest::option::of(("[a-z ]{1,20}", proptest::option::of("[a-z:/.]{1,20}")).prop_map(
        |(text, url)| Suggestion {
            text,
            image: None,
            url,
        },
    ))
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        ".{0,40}".prop_map(|text| Event::UserInput { text }),
        (0u64..100, arb_outcome()).prop_map(|(generation, outcome)| Event::ServiceResult {
            generation,
            outcome
        }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The transition function is total: no input panics
    #[test]
    fn transition_never_panics(state in arb_state(), session in arb_session(), event in arb_event()) {
        let _ = transition(&state, &session, event);
    }

    /// The generation counter never decreases
    #[test]
    fn generation_never_decreases(state in arb_state(), session in arb_session(), event in arb_event()) {
        let result = transition(&state, &session, event);
        prop_assert!(result.new_state.generation() >= state.generation());
    }

    /// Restart always resets the store and clears the session
    #[test]
    fn restart_always_resets(state in arb_state(), session in arb_session()) {
        let result = transition(&state, &session, Event::UserInput { text: "!restart".to_string() });

        prop_assert!(result.effects.contains(&Effect::Reset));
        prop_assert!(result.effects.contains(&Effect::ClearSession));
        prop_assert_eq!(result.new_session, SessionState::default());
    }

    /// Any directive outside the fixed five falls to the unrecognized branch
    #[test]
    fn unknown_directives_are_rejected(state in arb_state(), session in arb_session(), command in "[a-z]{1,12}") {
        prop_assume!(!KNOWN_COMMANDS.contains(&command.as_str()));

        let result = transition(&state, &session, Event::UserInput { text: format!("!{command}") });

        let appended: Vec<_> = result.effects.iter().filter_map(|e| match e {
            Effect::Append(draft) => Some(draft.text.as_str()),
            _ => None,
        }).collect();
        prop_assert_eq!(appended, vec![UNRECOGNIZED_TEXT]);
    }

    /// Plain text is echoed verbatim and never issues a service call
    #[test]
    fn plain_text_echoes_verbatim(state in arb_state(), session in arb_session(), text in "[^!].{0,30}") {
        let result = transition(&state, &session, Event::UserInput { text: text.clone() });

        let appended: Vec<_> = result.effects.iter().filter_map(|e| match e {
            Effect::Append(draft) => Some(draft.text.clone()),
            _ => None,
        }).collect();
        prop_assert_eq!(appended, vec![text]);
        prop_assert!(!result.effects.iter().any(|e| matches!(e, Effect::CallService { .. })), "plain text must not issue a service call");
    }

    /// A call-issuing submission always bumps the generation by exactly one
    #[test]
    fn calls_use_fresh_generation(state in arb_state(), session in arb_session()) {
        let result = transition(&state, &session, Event::UserInput { text: String::new() });

        let expected = state.generation() + 1;
        prop_assert_eq!(result.new_state.generation(), expected);
        prop_assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::CallService { generation, .. } if *generation == expected
        )), "a call-issuing submission must use the fresh generation");
    }

    /// Service results only ever apply to the exact in-flight generation
    #[test]
    fn mismatched_results_are_inert(state in arb_state(), session in arb_session(), generation in 0u64..100, outcome in arb_outcome()) {
        prop_assume!(!state.is_awaiting() || generation != state.generation());

        let result = transition(&state, &session, Event::ServiceResult { generation, outcome });

        prop_assert!(result.effects.is_empty());
        prop_assert_eq!(result.new_state, state);
    }
}
