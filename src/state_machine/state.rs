//! Conversation state types

use crate::gateway::ContinuationToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Turns
// ============================================================================

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Citation identifiers; always empty for user turns
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A turn before the store stamps it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnDraft {
    pub role: Role,
    pub content: String,
    pub sources: Vec<String>,
}

impl TurnDraft {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Request lifecycle of a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for the next question
    #[default]
    Idle,

    /// One request in flight; new submissions are rejected
    Submitting,
}

impl ChatState {
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, ChatState::Submitting)
    }
}

/// One chat conversation: transcript, continuation token and request state
///
/// Fields are private so the transcript can only grow through
/// [`Conversation::append`] and the token can only be set once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    id: String,
    transcript: Vec<Turn>,
    continuation_token: Option<ContinuationToken>,
    state: ChatState,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            transcript: Vec::new(),
            continuation_token: None,
            state: ChatState::Idle,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    #[must_use]
    pub fn last_turn(&self) -> Option<&Turn> {
        self.transcript.last()
    }

    #[must_use]
    pub fn continuation_token(&self) -> Option<&ContinuationToken> {
        self.continuation_token.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> ChatState {
        self.state
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Stamp and append a turn. The timestamp never goes below the previous turn's.
    pub(crate) fn append(&mut self, draft: TurnDraft, now: DateTime<Utc>) -> &Turn {
        let timestamp = match self.transcript.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.transcript.push(Turn {
            role: draft.role,
            content: draft.content,
            sources: draft.sources,
            timestamp,
        });
        &self.transcript[self.transcript.len() - 1]
    }

    /// Set the token if none is held yet. Returns whether it was adopted.
    pub(crate) fn adopt_token(&mut self, token: ContinuationToken) -> bool {
        if self.continuation_token.is_some() {
            return false;
        }
        self.continuation_token = Some(token);
        true
    }

    pub(crate) fn set_state(&mut self, state: ChatState) {
        self.state = state;
    }
}
