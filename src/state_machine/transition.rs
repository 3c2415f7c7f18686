//! Pure state transition function
//!
//! Submission guard, answer handling and failure reporting all live here;
//! the store only stamps turns and runs the resulting effects.

use super::{ChatState, Conversation, Effect, Event};
use crate::gateway::{coerce_user_id, Answer, ChatRequest};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Conversation is busy, cannot accept message until the current answer arrives")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same conversation and event it always produces the same
/// result, with no I/O.
///
/// # Errors
///
/// Returns [`TransitionError::Busy`] for a submission while an answer is
/// pending, [`TransitionError::EmptyMessage`] for blank text, and
/// [`TransitionError::InvalidTransition`] for a resolution with nothing in flight.
pub fn transition(
    conversation: &Conversation,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (conversation.state(), event) {
        // ============================================================
        // Submission
        // ============================================================
        (ChatState::Submitting, Event::Submit { .. }) => Err(TransitionError::Busy),

        (ChatState::Idle, Event::Submit { text, .. }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        // Idle + Submit -> Submitting
        (
            ChatState::Idle,
            Event::Submit {
                text,
                user_id,
                context,
            },
        ) => {
            let request = ChatRequest {
                message: text.clone(),
                session_id: conversation.continuation_token().cloned(),
                user_id: user_id.as_deref().and_then(coerce_user_id),
                context,
            };
            Ok(TransitionResult::new(ChatState::Submitting)
                .with_effect(Effect::append_user(text))
                .with_effect(Effect::RequestAnswer(request)))
        }

        // ============================================================
        // Resolution: always back to Idle
        // ============================================================
        (ChatState::Submitting, Event::AnswerReceived(answer)) => {
            let Answer {
                answer,
                sources,
                continuation_token,
            } = answer;
            let adopt = continuation_token
                .filter(|_| conversation.continuation_token().is_none())
                .map(Effect::AdoptToken);

            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::append_assistant(answer, sources))
                .with_effects(adopt))
        }

        (ChatState::Submitting, Event::RequestFailed { kind, .. }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::append_assistant(kind.user_message(), vec![])))
        }

        (ChatState::Submitting, Event::Abandoned) => Ok(TransitionResult::new(ChatState::Idle)),

        (ChatState::Idle, event) => Err(TransitionError::InvalidTransition(format!(
            "{} while idle",
            event.name()
        ))),
    }
}
