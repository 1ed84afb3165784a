//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the chat pipeline expects from
//! infrastructure. They use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client types in any signature
//! - Rendering is an opaque function from markdown to display-safe output
//! - Views receive already-rendered content and never see raw stream events

pub mod chat_transport;
pub mod render;

pub use chat_transport::{ChatRequest, ChatTransportPort, EventStream};
pub use render::{MarkdownRenderer, ResponseView};
