use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client as HttpClient;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{ChatRequest, Role};
use crate::sse::{parse_line, LineEvent, SseLineDecoder};
use crate::store::{ConversationStore, SendGuard};


pub const FAILURE_TITLE: &str = "Error";
pub const FAILURE_DESCRIPTION: &str = "Failed to get response. Please try again.";

/// How a send settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, nothing was sent.
    Skipped,
    /// The stream closed normally.
    Completed { message_id: String },
    /// The send failed; any text already streamed stays in place.
    Failed { message_id: Option<String> },
    /// The conversation was deleted while the reply was streaming.
    Cancelled,
}

/// Sends a conversation to the relay and streams the reply into the store.
#[derive(Clone)]
pub struct StreamConsumer {
    http: HttpClient,
    endpoint: String,
    token: Option<String>,
    idle_timeout: Duration,
    store: ConversationStore,
}

impl StreamConsumer {
    pub fn new(config: &ClientConfig, store: ConversationStore) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .connect_timeout(config.idle_timeout())
            .build()?;

        Ok(Self {
            http,
            endpoint: config.relay_url.clone(),
            token: config.token.clone(),
            idle_timeout: config.idle_timeout(),
            store,
        })
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Appends the user's text to the conversation and streams the reply.
    ///
    /// Errors are only returned when the send is refused up front (unknown
    /// conversation, or another reply still streaming into it). Everything
    /// after that is reported through the store and the returned outcome.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<SendOutcome, ClientError> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Skipped);
        }

        let guard = self.store.begin_send(conversation_id)?;
        self.store.append_message(conversation_id, Role::User, text)?;
        Ok(self.stream_reply(guard).await)
    }

    /// Streams the assistant reply for the conversation held by `guard`,
    /// whose transcript must already end with the user's message.
    pub async fn stream_reply(&self, guard: SendGuard) -> SendOutcome {
        let conversation_id = guard.conversation_id().to_string();
        let mut reply = Reply::default();

        let outcome = match self.run(&conversation_id, &mut reply).await {
            Ok(message_id) => {
                info!(
                    "Reply for {conversation_id} complete ({} chars)",
                    reply.text.chars().count()
                );
                SendOutcome::Completed { message_id }
            }
            Err(err) if err.is_cancellation() => {
                info!("Conversation {conversation_id} was deleted, stopping stream");
                SendOutcome::Cancelled
            }
            Err(err) => {
                error!("Chat error for {conversation_id}: {err}");
                self.store.notify(FAILURE_TITLE, FAILURE_DESCRIPTION);
                SendOutcome::Failed {
                    message_id: reply.message_id,
                }
            }
        };

        // Clears the typing indicator on every path.
        drop(guard);
        outcome
    }

    /// Returns the id of the assistant message the reply was streamed into.
    async fn run(&self, conversation_id: &str, reply: &mut Reply) -> Result<String, ClientError> {
        let request = ChatRequest {
            messages: self.store.outbound_messages(conversation_id)?,
        };
        debug!(
            "Awaiting response for {conversation_id} ({} messages)",
            request.messages.len()
        );

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = tokio::time::timeout(self.idle_timeout, builder.send())
            .await
            .map_err(|_| ClientError::Timeout(self.idle_timeout))??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Relay returned {status}: {body}");
            return Err(ClientError::Status(status.as_u16()));
        }
        if response.content_length() == Some(0) {
            return Err(ClientError::MissingStream);
        }

        let mut stream = response.bytes_stream();
        let message_id = self
            .store
            .append_message(conversation_id, Role::Assistant, "")?;
        reply.message_id = Some(message_id.clone());

        let mut decoder = SseLineDecoder::new();
        let mut first_chunk = true;
        loop {
            let next = tokio::time::timeout(self.idle_timeout, stream.next())
                .await
                .map_err(|_| ClientError::Timeout(self.idle_timeout))?;
            let Some(chunk) = next else { break };
            let chunk = chunk?;

            if first_chunk {
                debug!("Streaming reply into {conversation_id}/{message_id}");
                first_chunk = false;
            }

            for line in decoder.push(&chunk) {
                self.apply_line(conversation_id, &message_id, &line, &mut reply.text)?;
            }
        }

        if let Some(line) = decoder.finish() {
            self.apply_line(conversation_id, &message_id, &line, &mut reply.text)?;
        }
        Ok(message_id)
    }

    fn apply_line(
        &self,
        conversation_id: &str,
        message_id: &str,
        line: &str,
        text: &mut String,
    ) -> Result<(), ClientError> {
        match parse_line(line) {
            Ok(LineEvent::Delta(Some(delta))) if !delta.is_empty() => {
                text.push_str(&delta);
                self.store
                    .update_message_content(conversation_id, message_id, text)?;
            }
            Ok(LineEvent::Done) => debug!("End-of-stream marker for {message_id}"),
            Ok(_) => {}
            Err(err) => debug!("Ignoring partial fragment: {err}"),
        }
        Ok(())
    }
}

/// What has been streamed so far for one send.
#[derive(Default)]
struct Reply {
    message_id: Option<String>,
    text: String,
}
