//! Effects produced by state transitions

use super::state::TurnDraft;
use crate::gateway::{ChatRequest, ContinuationToken};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stamp and append a turn to the transcript
    AppendTurn(TurnDraft),

    /// Take the service's continuation token (only emitted while none is held)
    AdoptToken(ContinuationToken),

    /// Send a request through the gateway
    RequestAnswer(ChatRequest),
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendTurn(TurnDraft::user(content))
    }

    pub fn append_assistant(content: impl Into<String>, sources: Vec<String>) -> Self {
        Effect::AppendTurn(TurnDraft::assistant(content, sources))
    }
}
