//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::gateway::{Answer, ContinuationToken, ErrorKind, PageContext};
use chrono::Utc;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// Apply a transition the way the store does, minus the network
fn apply(conv: &mut Conversation, result: TransitionResult) {
    for effect in result.effects {
        match effect {
            Effect::AppendTurn(draft) => {
                conv.append(draft, Utc::now());
            }
            Effect::AdoptToken(token) => {
                conv.adopt_token(token);
            }
            Effect::RequestAnswer(_) => {}
        }
    }
    conv.set_state(result.new_state);
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_token() -> impl Strategy<Value = ContinuationToken> {
    prop_oneof![
        (0i64..10_000).prop_map(ContinuationToken::Number),
        "[a-z0-9]{3,12}".prop_map(ContinuationToken::Text),
    ]
}

fn arb_error_kind() -> impl Strategy<Value = ErrorKind> {
    proptest::sample::select(ErrorKind::ALL.to_vec())
}

fn arb_question() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z?][a-zA-Z0-9 ?]{0,40}"
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

fn arb_user_id() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (1i64..100_000).prop_map(|id| Some(id.to_string())),
        "[a-z]{1,8}".prop_map(Some),
    ]
}

fn arb_answer() -> impl Strategy<Value = Answer> {
    (
        "[a-zA-Z .]{0,60}",
        proptest::collection::vec("ch[0-9]{1,2}", 0..4),
        proptest::option::of(arb_token()),
    )
        .prop_map(|(answer, sources, continuation_token)| Answer {
            answer,
            sources,
            continuation_token,
        })
}

fn arb_conversation() -> impl Strategy<Value = Conversation> {
    (proptest::option::of(arb_token()), 0usize..4, any::<bool>()).prop_map(
        |(token, turns, busy)| {
            let mut conv = Conversation::new();
            if let Some(token) = token {
                conv.adopt_token(token);
            }
            for i in 0..turns {
                conv.append(TurnDraft::user(format!("q{i}")), Utc::now());
            }
            if busy {
                conv.set_state(ChatState::Submitting);
            }
            conv
        },
    )
}

fn arb_submit() -> impl Strategy<Value = Event> {
    (
        prop_oneof![arb_question(), arb_blank()],
        arb_user_id(),
    )
        .prop_map(|(text, user_id)| Event::Submit {
            text,
            user_id,
            context: PageContext::default(),
        })
}

fn arb_resolution() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_answer().prop_map(Event::AnswerReceived),
        arb_error_kind().prop_map(|kind| Event::RequestFailed {
            kind,
            message: kind.to_string(),
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => arb_submit(),
        2 => arb_resolution(),
        1 => Just(Event::Abandoned),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn busy_rejects_every_submission(mut conv in arb_conversation(), event in arb_submit()) {
        conv.set_state(ChatState::Submitting);
        prop_assert_eq!(transition(&conv, event).unwrap_err(), TransitionError::Busy);
    }

    #[test]
    fn blank_text_never_submits(text in arb_blank(), user_id in arb_user_id()) {
        let event = Event::Submit { text, user_id, context: PageContext::default() };
        prop_assert_eq!(
            transition(&Conversation::new(), event).unwrap_err(),
            TransitionError::EmptyMessage
        );
    }

    #[test]
    fn valid_submission_appends_one_user_turn(
        mut conv in arb_conversation(),
        text in arb_question(),
        user_id in arb_user_id(),
    ) {
        conv.set_state(ChatState::Idle);
        let event = Event::Submit { text: text.clone(), user_id, context: PageContext::default() };
        let result = transition(&conv, event).unwrap();

        prop_assert_eq!(result.new_state, ChatState::Submitting);
        prop_assert_eq!(result.effects.len(), 2);
        prop_assert_eq!(&result.effects[0], &Effect::append_user(text.clone()));
        match &result.effects[1] {
            Effect::RequestAnswer(request) => {
                prop_assert_eq!(&request.message, &text);
                prop_assert_eq!(request.session_id.as_ref(), conv.continuation_token());
            }
            other => prop_assert!(false, "expected request, got {:?}", other),
        }
    }

    #[test]
    fn every_resolution_releases_busy(mut conv in arb_conversation(), event in arb_resolution()) {
        conv.set_state(ChatState::Submitting);
        let result = transition(&conv, event).unwrap();
        prop_assert_eq!(result.new_state, ChatState::Idle);
        let appended = result.effects.iter().filter(|e| matches!(e, Effect::AppendTurn(_))).count();
        prop_assert_eq!(appended, 1);
    }

    #[test]
    fn token_adopted_only_when_unset(mut conv in arb_conversation(), answer in arb_answer()) {
        conv.set_state(ChatState::Submitting);
        let offered = answer.continuation_token.clone();
        let result = transition(&conv, Event::AnswerReceived(answer)).unwrap();
        let adopted = result.effects.iter().any(|e| matches!(e, Effect::AdoptToken(_)));
        prop_assert_eq!(adopted, conv.continuation_token().is_none() && offered.is_some());
    }

    #[test]
    fn event_sequences_preserve_invariants(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut conv = Conversation::new();
        let mut first_token: Option<ContinuationToken> = None;

        for event in events {
            let before = conv.clone();
            match transition(&conv, event) {
                Ok(result) => apply(&mut conv, result),
                Err(_) => {
                    // Rejected events leave nothing behind
                    prop_assert_eq!(&conv, &before);
                    continue;
                }
            }

            // Transcript only grows, and earlier turns are untouched
            prop_assert!(conv.transcript().len() >= before.transcript().len());
            prop_assert_eq!(
                &conv.transcript()[..before.transcript().len()],
                before.transcript()
            );

            // Timestamps never go backwards
            for pair in conv.transcript().windows(2) {
                prop_assert!(pair[0].timestamp <= pair[1].timestamp);
            }

            // User turns never carry sources
            for turn in conv.transcript() {
                if turn.role == Role::User {
                    prop_assert!(turn.sources.is_empty());
                    prop_assert!(!turn.content.trim().is_empty());
                }
            }

            // Token is set once and never changes
            match (&first_token, conv.continuation_token()) {
                (None, Some(token)) => first_token = Some(token.clone()),
                (Some(held), current) => prop_assert_eq!(Some(held), current),
                (None, None) => {}
            }
        }
    }
}
