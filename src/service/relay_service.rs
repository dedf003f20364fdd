use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use tracing::{error, info, warn};

use crate::agent::GroqAgentService;
use crate::config::{RelayConfig, API_KEY_VAR};
use crate::errors::AppError;
use crate::models::ChatMessage;

pub const EVENT_STREAM: &str = "text/event-stream";

/// Stateless relay: checks configuration, forwards the transcript upstream and
/// hands back the upstream event stream byte for byte.
#[derive(Clone)]
pub struct RelayService {
    api_key: Option<String>,
    agent: GroqAgentService,
}

impl RelayService {
    pub fn new(config: &RelayConfig, agent: GroqAgentService) -> Self {
        Self {
            api_key: config.api_key.clone(),
            agent,
        }
    }

    /// The upstream key, or the configuration error every request gets
    /// while it is unset.
    pub fn credential(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or(AppError::MissingCredential { var: API_KEY_VAR })
    }

    pub async fn relay(
        &self,
        api_key: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<Response, AppError> {
        info!("Relaying conversation with {} messages", messages.len());

        let upstream = match self.agent.stream_chat(api_key, messages).await {
            Ok(response) => response,
            Err(AppError::UpstreamStatus { status, body }) => {
                error!("Upstream API error: {status} {body}");
                return Err(AppError::UpstreamStatus { status, body });
            }
            Err(err) => return Err(err),
        };

        let stream = upstream
            .bytes_stream()
            .inspect_err(|e| warn!("Upstream stream ended with error: {e}"));

        let mut response = Body::from_stream(stream).into_response();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(EVENT_STREAM));
        Ok(response)
    }
}
