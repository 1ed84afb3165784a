//! Core of the botvault chat client.
//!
//! Domain types, the chat error taxonomy, settings, the ports adapters
//! implement, and the streaming chat pipeline built on them.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod errors;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    Attachment, AttachmentKind, AttachmentPayload, CANCELLED_MARKER, FinalizedResponse, Message,
    MessageRole, Metrics, ModelDescriptor, Outcome, StreamEvent,
};
pub use errors::{ChatError, ChatResult};
pub use ports::{ChatRequest, ChatTransportPort, EventStream, MarkdownRenderer, ResponseView};
pub use services::{CancellationController, ChatSession, ConversationState, RequestToken};
pub use settings::{ChatSettings, SettingsError, validate_settings};

// Re-exported so adapters share the exact token type used by the ports.
pub use tokio_util::sync::CancellationToken;
