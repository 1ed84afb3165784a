//! Terminal front end for botvault.
//!
//! The binary in `main.rs` is the composition root: it builds settings from
//! flags and environment, wires [`botvault_client::OllamaClient`] and a
//! renderer into a [`botvault_core::ChatSession`], and dispatches to the
//! handlers here.
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only.
use dotenvy as _;
use tracing_subscriber as _;

pub mod attachments;
pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
