//! Chat transport port.
//!
//! Abstracts the model server: issuing a chat request and listing the
//! model catalog.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;
use tokio_util::sync::CancellationToken;

use crate::domain::{Message, ModelDescriptor, StreamEvent};
use crate::errors::ChatResult;
use crate::settings::ChatSettings;

/// Lazy, forward-only sequence of decoded stream events.
///
/// An `Err` item is terminal: the stream yields nothing after it.
pub type EventStream = Pin<Box<dyn Stream<Item = ChatResult<StreamEvent>> + Send>>;

/// Everything the transport needs to issue one chat call.
///
/// Built from a snapshot of the history; the transport never sees the live
/// conversation state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub keep_alive: String,
    pub temperature: f32,
}

impl ChatRequest {
    /// Build a request from settings and a history snapshot.
    pub fn from_settings(settings: &ChatSettings, messages: Vec<Message>) -> Self {
        Self {
            model: settings.model.clone(),
            messages,
            stream: settings.stream,
            keep_alive: settings.keep_alive.clone(),
            temperature: settings.temperature,
        }
    }
}

/// Port for talking to a chat model server.
#[async_trait]
pub trait ChatTransportPort: Send + Sync {
    /// Send a chat request and return the decoded event stream.
    ///
    /// Fails with `Timeout` if no response headers arrive in time,
    /// `Network` if the connection fails, `ModelNotFound` on 404 and `Http`
    /// on any other non-success status. Cancellation observed before or
    /// during the call yields `Cancelled`. The returned stream also observes
    /// `cancel` and stops delivering events once it fires.
    async fn send_chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> ChatResult<EventStream>;

    /// List the models the server offers.
    ///
    /// Same timeout and error classification as `send_chat`; idempotent.
    async fn list_models(&self) -> ChatResult<Vec<ModelDescriptor>>;
}
