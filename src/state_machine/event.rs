//! Events that can occur in a conversation

use crate::gateway::{Answer, ErrorKind, PageContext};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
        /// Raw identity from the auth context, coerced when the request is built
        user_id: Option<String>,
        context: PageContext,
    },

    // Gateway events
    AnswerReceived(Answer),
    RequestFailed {
        kind: ErrorKind,
        message: String,
    },
    /// The caller stopped waiting before the exchange resolved
    Abandoned,
}

impl Event {
    pub fn submit(text: impl Into<String>, user_id: Option<&str>) -> Self {
        Event::Submit {
            text: text.into(),
            user_id: user_id.map(str::to_string),
            context: PageContext::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::AnswerReceived(_) => "answer_received",
            Event::RequestFailed { .. } => "request_failed",
            Event::Abandoned => "abandoned",
        }
    }
}
