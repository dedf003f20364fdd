mod prompt;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error};

use crate::config::{RelayConfig, MAX_TOKENS, TEMPERATURE};
use crate::errors::AppError;
use crate::models::{ChatMessage, CompletionMessage, CompletionRequest, CompletionRole};

pub use prompt::SYSTEM_PROMPT;

/// Builds the upstream request: exactly one system message followed by the
/// caller's transcript, in order.
pub fn build_completion_request(model: &str, messages: Vec<ChatMessage>) -> CompletionRequest {
    let mut upstream = Vec::with_capacity(messages.len() + 1);
    upstream.push(CompletionMessage {
        role: CompletionRole::System,
        content: SYSTEM_PROMPT.to_string(),
    });
    upstream.extend(messages.into_iter().map(CompletionMessage::from));

    CompletionRequest {
        model: model.to_string(),
        messages: upstream,
        stream: true,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Thin client for the Groq OpenAI-compatible chat completion API.
/// One attempt per call, no retries.
#[derive(Clone)]
pub struct GroqAgentService {
    http: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GroqAgentService {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        // No whole-request timeout: it would cut long streams short.
        let http = Client::builder()
            .connect_timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: config.upstream_timeout,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Opens a streamed completion. On success the response is returned with
    /// its body untouched so the caller can pipe it through.
    pub async fn stream_chat(
        &self,
        api_key: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<reqwest::Response, AppError> {
        let url = self.completions_url();
        let body = build_completion_request(&self.model, messages);
        debug!(
            "Requesting {} with {} messages (model {})",
            url,
            body.messages.len(),
            body.model
        );

        let send = self.http.post(&url).bearer_auth(api_key).json(&body).send();

        let response = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                error!("Upstream request to {url} failed: {source}");
                return Err(AppError::UpstreamUnavailable { url, source });
            }
            Err(_) => {
                error!("Upstream request to {url} timed out after {:?}", self.timeout);
                return Err(AppError::UpstreamTimeout {
                    url,
                    after: self.timeout,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}
