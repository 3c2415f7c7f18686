//! HTTP implementation of the answering-service exchange

use super::types::{Answer, ChatReply, ChatRequest};
use super::{AnswerService, FailureSignal, GatewayConfig, GatewayError};
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as _;

/// Talks to `POST {base_url}/api/chat/`
pub struct HttpGateway {
    client: Client,
    url: String,
}

impl HttpGateway {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built, e.g. when no TLS backend initializes.
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.chat_url(),
        })
    }
}

#[async_trait]
impl AnswerService for HttpGateway {
    async fn ask(&self, request: &ChatRequest) -> Result<Answer, GatewayError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            // The body only matters for spotting the upstream marker
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_signal(&FailureSignal::Status {
                code: status.as_u16(),
                body: &body,
            }));
        }

        let body = response.text().await.map_err(|e| transport_error(&e))?;

        let reply: ChatReply = serde_json::from_str(&body).map_err(|e| {
            GatewayError::from_signal(&FailureSignal::Malformed {
                description: &format!("{e} - body: {body}"),
            })
        })?;

        Ok(reply.into())
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

fn transport_error(err: &reqwest::Error) -> GatewayError {
    let description = describe_chain(err);
    GatewayError::from_signal(&FailureSignal::Transport {
        description: &description,
        connect: err.is_connect(),
        timed_out: err.is_timeout(),
    })
}

/// reqwest keeps the useful part ("Connection refused") in the source chain
fn describe_chain(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
