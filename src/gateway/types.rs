//! Wire and domain types for the answering service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque conversation identifier issued by the service (`session_id` on the wire)
///
/// The service may send either a string or an integer; the token is echoed
/// back in whichever form it arrived.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContinuationToken {
    Number(i64),
    Text(String),
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContinuationToken::Number(n) => write!(f, "{n}"),
            ContinuationToken::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ContinuationToken {
    fn from(value: &str) -> Self {
        ContinuationToken::Text(value.to_string())
    }
}

impl From<i64> for ContinuationToken {
    fn from(value: i64) -> Self {
        ContinuationToken::Number(value)
    }
}

/// Optional page context the reader was looking at when asking
///
/// The fields are part of the service's chat model, but its current
/// `/api/chat/` handler only reads `message`, `session_id` and `user_id`
/// and ignores these. They are sent so a context-aware backend can use them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Text the reader highlighted on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    /// Slug of the chapter being read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_slug: Option<String>,
}

impl PageContext {
    #[must_use]
    pub fn chapter(slug: impl Into<String>) -> Self {
        Self {
            selected_text: None,
            chapter_slug: Some(slug.into()),
        }
    }

    #[must_use]
    pub fn with_selection(mut self, text: impl Into<String>) -> Self {
        self.selected_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_text.is_none() && self.chapter_slug.is_none()
    }
}

/// Body of `POST /api/chat/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<ContinuationToken>,
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub context: PageContext,
}

/// Successful response body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub session_id: Option<ContinuationToken>,
}

/// A successful answer, normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
    pub continuation_token: Option<ContinuationToken>,
}

impl Answer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
            continuation_token: None,
        }
    }

    #[must_use]
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<ContinuationToken>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }
}

impl From<ChatReply> for Answer {
    fn from(reply: ChatReply) -> Self {
        Self {
            answer: reply.response,
            sources: reply.sources.unwrap_or_default(),
            continuation_token: reply.session_id,
        }
    }
}

/// Coerce an identity from the auth context into the integer the service expects
///
/// Accepts decimal integers and integral floats ("42", " 42 ", "42.0").
/// Anything else yields `None`, which is sent as `null`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn coerce_user_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
