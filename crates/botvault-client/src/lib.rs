//! Ollama adapter for botvault.
//!
//! Implements [`botvault_core::ChatTransportPort`] over HTTP. The streamed
//! response body is decoded by [`NdjsonDecoder`] into the domain's
//! [`botvault_core::StreamEvent`]s.
#![deny(unused_crate_dependencies)]

// Only used by the integration tests.
#[cfg(test)]
use axum as _;

mod client;
mod config;
mod decoder;
mod wire;

pub use client::OllamaClient;
pub use config::{CHAT_PATH, ClientConfig, TAGS_PATH};
pub use decoder::NdjsonDecoder;
