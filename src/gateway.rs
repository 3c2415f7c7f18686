//! Request gateway to the answering service
//!
//! Performs one request/response exchange per question and reduces every
//! failure to a closed set of [`ErrorKind`]s.

mod config;
mod error;
mod http;
mod types;

#[cfg(test)]
mod proptests;

pub use config::{GatewayConfig, DEFAULT_BASE_URL};
pub use error::{classify, ErrorKind, FailureSignal, GatewayError, UPSTREAM_MARKER};
pub use http::HttpGateway;
pub use types::{coerce_user_id, Answer, ChatRequest, ContinuationToken, PageContext};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for answering-service exchanges
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask one question; no retries
    async fn ask(&self, request: &ChatRequest) -> Result<Answer, GatewayError>;

    /// Where requests go, for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: AnswerService + ?Sized> AnswerService for Arc<T> {
    async fn ask(&self, request: &ChatRequest) -> Result<Answer, GatewayError> {
        (**self).ask(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for answer services
pub struct LoggingGateway {
    inner: Arc<dyn AnswerService>,
    endpoint: String,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn AnswerService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl AnswerService for LoggingGateway {
    async fn ask(&self, request: &ChatRequest) -> Result<Answer, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.ask(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(answer) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    sources = answer.sources.len(),
                    has_token = answer.continuation_token.is_some(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    error_kind = %e.kind,
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
