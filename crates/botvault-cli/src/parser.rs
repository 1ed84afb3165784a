//! Main CLI parser and top-level argument handling.
//!
//! Connection and sampling options are global so they apply to every
//! subcommand. Each can also come from the environment (or a `.env` file).

use clap::Parser;

use botvault_core::ChatSettings;
use botvault_core::settings::{
    DEFAULT_BASE_URL, DEFAULT_KEEP_ALIVE, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_TEMPERATURE,
};

use crate::commands::Commands;

/// Command-line interface definition for the botvault chat client.
#[derive(Parser)]
#[command(name = "botvault")]
#[command(about = "Chat with models served by a local Ollama instance")]
#[command(version)]
pub struct Cli {
    /// Base URL of the Ollama server
    #[arg(long = "url", env = "BOTVAULT_OLLAMA_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Model to chat with
    #[arg(short, long, env = "BOTVAULT_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Sampling temperature (0.0-2.0)
    #[arg(short, long, env = "BOTVAULT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE, global = true)]
    pub temperature: f32,

    /// Timeout for connecting and receiving response headers, in milliseconds
    #[arg(long = "timeout-ms", env = "BOTVAULT_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS, global = true)]
    pub timeout_ms: u64,

    /// How long Ollama keeps the model loaded after a request
    #[arg(long = "keep-alive", default_value = DEFAULT_KEEP_ALIVE, global = true)]
    pub keep_alive: String,

    /// Wait for the whole reply instead of streaming it
    #[arg(long = "no-stream", global = true)]
    pub no_stream: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Chat settings described by the global options.
    pub fn settings(&self) -> ChatSettings {
        ChatSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            stream: !self.no_stream,
            keep_alive: self.keep_alive.clone(),
            request_timeout_ms: self.timeout_ms,
            ..ChatSettings::with_defaults()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "botvault",
            "--url",
            "http://lan-host:4311/ollama",
            "models",
            "--model",
            "llama3.2",
            "-t",
            "0.7",
            "--no-stream",
        ]);
        let settings = cli.settings();
        assert_eq!(settings.base_url, "http://lan-host:4311/ollama");
        assert_eq!(settings.model, "llama3.2");
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!settings.stream);
        assert!(matches!(cli.command, Some(Commands::Models)));
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::parse_from(["botvault"]);
        assert!(cli.command.is_none());
    }
}
