//! Gateway error types and failure classification

use std::borrow::Cow;
use thiserror::Error;

/// Text the answering service embeds in failure bodies when its model backend fails
pub const UPSTREAM_MARKER: &str = "AI service error";

/// Gateway error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    /// Diagnostic text for logs; readers see `kind.user_message()` instead
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a raw failure signal and keep its description as the message
    #[must_use]
    pub fn from_signal(signal: &FailureSignal<'_>) -> Self {
        Self::new(classify(signal), signal.describe())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message)
    }
}

/// Closed set of failure categories shown to the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401 / 403
    AuthenticationRequired,
    /// 404: the chat endpoint is missing
    ServiceUnavailable,
    /// 500
    ServiceError,
    /// The service answered but its model backend failed
    UpstreamUnavailable,
    /// No response at all
    NetworkError,
    /// Connection refused or host unreachable
    BackendUnreachable,
    /// The configured request deadline elapsed
    TimedOut,
    UnknownError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::AuthenticationRequired,
        ErrorKind::ServiceUnavailable,
        ErrorKind::ServiceError,
        ErrorKind::UpstreamUnavailable,
        ErrorKind::NetworkError,
        ErrorKind::BackendUnreachable,
        ErrorKind::TimedOut,
        ErrorKind::UnknownError,
    ];

    /// Fixed message appended to the transcript for this kind
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::AuthenticationRequired => "Authentication error. Please log in again.",
            ErrorKind::ServiceUnavailable => {
                "Chat service not found. Backend might be down. Please contact admin."
            }
            ErrorKind::ServiceError => {
                "Server error occurred. Backend might be experiencing issues. Please try again later."
            }
            ErrorKind::UpstreamUnavailable => {
                "AI service is temporarily unavailable. Please try again later."
            }
            ErrorKind::NetworkError => {
                "Network error. Please check your connection or if backend is running."
            }
            ErrorKind::BackendUnreachable => {
                "Cannot connect to backend server. Please make sure backend is running."
            }
            ErrorKind::TimedOut => "The request timed out. Please try again.",
            ErrorKind::UnknownError => "Sorry, I encountered an error. Please try again.",
        }
    }

    /// Short name for structured logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::AuthenticationRequired => "authentication_required",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::ServiceError => "service_error",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::BackendUnreachable => "backend_unreachable",
            ErrorKind::TimedOut => "timed_out",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about a failed exchange at the point it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSignal<'a> {
    /// A response arrived with a non-success status
    Status { code: u16, body: &'a str },
    /// No response was received
    Transport {
        description: &'a str,
        connect: bool,
        timed_out: bool,
    },
    /// A success status whose body is not a usable answer
    Malformed { description: &'a str },
}

impl FailureSignal<'_> {
    fn text(&self) -> &str {
        match self {
            FailureSignal::Status { body, .. } => body,
            FailureSignal::Transport { description, .. }
            | FailureSignal::Malformed { description } => description,
        }
    }

    fn describe(&self) -> String {
        match self {
            FailureSignal::Status { code, body } => format!("HTTP {code}: {}", excerpt(body)),
            FailureSignal::Transport { description, .. } => {
                format!("Request failed: {description}")
            }
            FailureSignal::Malformed { description } => {
                format!("Unreadable answer: {}", excerpt(description))
            }
        }
    }
}

/// Longest slice of a response body kept in an error message
const EXCERPT_CHARS: usize = 300;

/// Bodies can be whole HTML pages; classification sees all of it, messages only the head
fn excerpt(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}... ({} bytes)", &text[..cut], text.len())),
        None => Cow::Borrowed(text),
    }
}

/// Map a failure signal to its kind. Order of the arms is the precedence.
#[must_use]
pub fn classify(signal: &FailureSignal<'_>) -> ErrorKind {
    match signal {
        FailureSignal::Status { code: 401 | 403, .. } => ErrorKind::AuthenticationRequired,
        FailureSignal::Status { code: 404, .. } => ErrorKind::ServiceUnavailable,
        FailureSignal::Status { code: 500, .. } => ErrorKind::ServiceError,
        _ if signal.text().contains(UPSTREAM_MARKER) => ErrorKind::UpstreamUnavailable,
        FailureSignal::Transport {
            timed_out: true, ..
        } => ErrorKind::TimedOut,
        FailureSignal::Transport { connect: true, .. } => ErrorKind::BackendUnreachable,
        FailureSignal::Transport { description, .. } if mentions_refused(description) => {
            ErrorKind::BackendUnreachable
        }
        FailureSignal::Transport { .. } => ErrorKind::NetworkError,
        FailureSignal::Status { .. } | FailureSignal::Malformed { .. } => ErrorKind::UnknownError,
    }
}

fn mentions_refused(description: &str) -> bool {
    let lower = description.to_ascii_lowercase();
    ["connection refused", "econnrefused", "unreachable", "failed to connect"]
        .iter()
        .any(|needle| lower.contains(needle))
}
