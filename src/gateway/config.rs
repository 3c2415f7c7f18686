//! Gateway configuration

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Configuration for reaching the answering service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Service origin, without the `/api/chat/` path
    pub base_url: String,
    /// Deadline for one exchange. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("DOCS_CHAT_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout = lookup("DOCS_CHAT_TIMEOUT_SECS")
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            base_url,
            request_timeout,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full URL of the chat endpoint
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat/", self.base_url.trim_end_matches('/'))
    }
}
