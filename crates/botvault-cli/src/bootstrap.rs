//! CLI bootstrap - the composition root.
//!
//! The only place where adapters are instantiated: the Ollama transport and
//! the renderer chosen by the output format. Handlers receive a
//! [`CliContext`] and build sessions from it.

use std::sync::Arc;

use tracing::debug;

use botvault_client::OllamaClient;
use botvault_core::{ChatSession, ChatSettings, MarkdownRenderer, validate_settings};
use botvault_render::{HtmlRenderer, PlainTextRenderer};

use crate::commands::OutputFormat;
use crate::error::CliError;

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub settings: ChatSettings,
    pub client: Arc<OllamaClient>,
}

impl CliContext {
    /// A fresh chat session rendering for `format`.
    pub fn session(&self, format: OutputFormat) -> ChatSession {
        ChatSession::new(
            self.client.clone(),
            renderer_for(format),
            self.settings.clone(),
        )
    }
}

/// Renderer used while streaming in the given format.
///
/// Terminal formats stream raw markdown; HTML output goes through the
/// sanitizing renderer.
pub fn renderer_for(format: OutputFormat) -> Arc<dyn MarkdownRenderer> {
    match format {
        OutputFormat::Text | OutputFormat::Markdown => Arc::new(PlainTextRenderer),
        OutputFormat::Html => Arc::new(HtmlRenderer::new()),
    }
}

/// Validate settings and build the transport.
pub fn bootstrap(settings: ChatSettings) -> Result<CliContext, CliError> {
    validate_settings(&settings)?;
    let client = OllamaClient::from_settings(&settings)?;
    debug!(
        base_url = %settings.base_url,
        model = %settings.model,
        stream = settings.stream,
        "Bootstrapped CLI context"
    );
    Ok(CliContext {
        settings,
        client: Arc::new(client),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_rejects_invalid_settings() {
        let settings = ChatSettings {
            temperature: 3.0,
            ..ChatSettings::with_defaults()
        };
        let Err(err) = bootstrap(settings) else {
            panic!("expected a config error");
        };
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_html_format_sanitizes() {
        let rendered = renderer_for(OutputFormat::Html).render("<script>x</script>");
        assert!(!rendered.contains("<script>"));

        let raw = renderer_for(OutputFormat::Text).render("<script>x</script>");
        assert_eq!(raw, "<script>x</script>");
    }
}
