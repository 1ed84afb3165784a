//! Ollama API wire types.
//!
//! Serde mirrors of the `/api/chat` and `/api/tags` JSON bodies. Domain
//! types are converted at the edges of this module and never serialized
//! directly.

use serde::{Deserialize, Deserializer, Serialize};

use botvault_core::{ChatRequest, Message, Metrics, ModelDescriptor, StreamEvent};

// =============================================================================
// Chat request
// =============================================================================

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OllamaChatMessage<'a>>,
    pub stream: bool,
    pub keep_alive: &'a str,
    pub options: OllamaOptions,
}

/// A single chat message in Ollama format.
#[derive(Debug, Serialize)]
pub struct OllamaChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
    /// Omitted entirely when there are no images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<&'a [String]>,
}

/// Sampling options.
#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    pub temperature: f32,
}

impl<'a> From<&'a Message> for OllamaChatMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
            images: (!message.images.is_empty()).then_some(message.images.as_slice()),
        }
    }
}

impl<'a> From<&'a ChatRequest> for OllamaChatRequest<'a> {
    fn from(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages.iter().map(OllamaChatMessage::from).collect(),
            stream: request.stream,
            keep_alive: &request.keep_alive,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        }
    }
}

// =============================================================================
// Chat response records
// =============================================================================

/// One NDJSON record of a chat response.
///
/// A non-streamed response is a single record of the same shape.
#[derive(Debug, Default, Deserialize)]
pub struct OllamaChatChunk {
    #[serde(default)]
    pub message: Option<OllamaChunkMessage>,
    #[serde(default)]
    pub done: bool,
    /// Set when generation fails after the response has started.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub load_duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub prompt_eval_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub prompt_eval_duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub eval_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub eval_duration: Option<u64>,
}

/// Metrics are advisory: a value that is not a non-negative integer reads
/// as absent instead of rejecting the record and its content.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_u64()))
}

/// The `message` object inside a response record.
#[derive(Debug, Default, Deserialize)]
pub struct OllamaChunkMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl OllamaChatChunk {
    /// Split the record into the events it carries, in delivery order.
    ///
    /// A record can carry both trailing content and the terminal `done`.
    pub fn into_events(self) -> impl Iterator<Item = StreamEvent> {
        let metrics = Metrics {
            total_duration_ns: self.total_duration,
            load_duration_ns: self.load_duration,
            prompt_eval_count: self.prompt_eval_count,
            prompt_eval_duration_ns: self.prompt_eval_duration,
            eval_count: self.eval_count,
            eval_duration_ns: self.eval_duration,
        };
        let delta = self
            .message
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .map(StreamEvent::ContentDelta);
        let done = self.done.then_some(StreamEvent::Done(metrics));
        delta.into_iter().chain(done)
    }
}

// =============================================================================
// Model catalog
// =============================================================================

/// Response body for `GET /api/tags`.
#[derive(Debug, Default, Deserialize)]
pub struct OllamaTagsResponse {
    #[serde(default)]
    pub models: Vec<OllamaTagEntry>,
}

/// A single model in the catalog.
#[derive(Debug, Deserialize)]
pub struct OllamaTagEntry {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl From<OllamaTagEntry> for ModelDescriptor {
    fn from(entry: OllamaTagEntry) -> Self {
        Self {
            name: entry.name,
            size: entry.size,
            modified_at: entry.modified_at,
        }
    }
}
