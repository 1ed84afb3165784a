//! Ollama HTTP transport.
//!
//! Opens the streaming `POST /api/chat` exchange and hands the response body
//! to [`NdjsonDecoder`]. The request timeout covers connecting and receiving
//! response headers; once the body starts streaming only cancellation or the
//! server closing the connection ends it.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use botvault_core::{
    ChatError, ChatRequest, ChatResult, ChatSettings, ChatTransportPort, EventStream,
    ModelDescriptor,
};

use crate::config::{CHAT_PATH, ClientConfig, TAGS_PATH};
use crate::decoder::NdjsonDecoder;
use crate::wire::{OllamaChatRequest, OllamaTagsResponse};

/// Ollama transport over reqwest.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OllamaClient {
    pub fn new(config: ClientConfig) -> ChatResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChatError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn from_settings(settings: &ChatSettings) -> ChatResult<Self> {
        Self::new(ClientConfig::from_settings(settings))
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request under the configured timeout, racing cancellation.
    async fn send_with_timeout(
        &self,
        request: reqwest::RequestBuilder,
        cancel: Option<&CancellationToken>,
    ) -> ChatResult<reqwest::Response> {
        let timeout = self.config.request_timeout;
        let send = tokio::time::timeout(timeout, request.send());

        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => return Err(ChatError::Cancelled),
                result = send => result,
            },
            None => send.await,
        };

        match result {
            Err(_elapsed) => {
                warn!(timeout_ms = timeout.as_millis(), "Ollama request timed out");
                Err(ChatError::Timeout)
            }
            Ok(Err(e)) => Err(classify_reqwest_error(&e)),
            Ok(Ok(response)) => Ok(response),
        }
    }
}

/// Map a reqwest failure before any response was received.
fn classify_reqwest_error(error: &reqwest::Error) -> ChatError {
    if error.is_timeout() {
        return ChatError::Timeout;
    }
    warn!("Ollama request failed: {error}");
    ChatError::Network(error.to_string())
}

/// Map a non-success status to the chat error taxonomy.
fn classify_status(status: StatusCode, model: &str) -> ChatError {
    if status == StatusCode::NOT_FOUND {
        ChatError::ModelNotFound {
            model: model.to_string(),
        }
    } else {
        ChatError::Http {
            status: status.as_u16(),
        }
    }
}

#[async_trait]
impl ChatTransportPort for OllamaClient {
    async fn send_chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> ChatResult<EventStream> {
        let url = self.config.endpoint(CHAT_PATH);
        let body = OllamaChatRequest::from(request);
        debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Sending chat request"
        );

        let response = self
            .send_with_timeout(self.http.post(&url).json(&body), Some(cancel))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, detail = %detail.trim(), "Ollama rejected chat request");
            return Err(classify_status(status, &request.model));
        }

        info!(model = %request.model, "Chat stream opened");
        let decoder = NdjsonDecoder::new(response.bytes_stream().boxed(), cancel.clone());
        Ok(decoder.into_stream().boxed())
    }

    async fn list_models(&self) -> ChatResult<Vec<ModelDescriptor>> {
        let url = self.config.endpoint(TAGS_PATH);
        debug!(url = %url, "Listing models");

        let response = self.send_with_timeout(self.http.get(&url), None).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Http {
                status: status.as_u16(),
            });
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;
        debug!(count = tags.models.len(), "Model catalog received");
        Ok(tags.models.into_iter().map(ModelDescriptor::from).collect())
    }
}
