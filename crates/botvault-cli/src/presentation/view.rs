//! Terminal implementation of the response view.
//!
//! In text mode each paint prints only what was added since the previous
//! paint, so the reply appears to stream. The other formats print nothing
//! until the turn is finished.

use std::io::{self, Stderr, Stdout, Write};

use crossterm::style::Stylize;
use termimad::MadSkin;
use tracing::warn;

use botvault_core::{FinalizedResponse, Outcome, ResponseView};

use crate::commands::OutputFormat;

pub struct TerminalView<O = Stdout, E = Stderr> {
    out: O,
    err: E,
    format: OutputFormat,
    shown: String,
}

impl TerminalView {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::with_writers(io::stdout(), io::stderr(), format)
    }
}

impl<O: Write, E: Write> TerminalView<O, E> {
    pub const fn with_writers(out: O, err: E, format: OutputFormat) -> Self {
        Self {
            out,
            err,
            format,
            shown: String::new(),
        }
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_delta(&mut self, rendered: &str) -> io::Result<()> {
        if let Some(delta) = rendered.strip_prefix(self.shown.as_str()) {
            self.out.write_all(delta.as_bytes())?;
        } else {
            // Renderer rewrote earlier output; start over on a new line.
            writeln!(self.out)?;
            self.out.write_all(rendered.as_bytes())?;
        }
        self.shown.clear();
        self.shown.push_str(rendered);
        self.out.flush()
    }

    fn write_finish(&mut self, response: &FinalizedResponse) -> io::Result<()> {
        let error_line = response.error_line();
        match self.format {
            OutputFormat::Text => {
                if !self.shown.is_empty() {
                    writeln!(self.out)?;
                }
            }
            // Deferred formats replace a failed body with the error line.
            _ if error_line.is_some() => {}
            OutputFormat::Markdown => {
                if !response.content.is_empty() {
                    let skin = MadSkin::default();
                    write!(self.out, "{}", skin.term_text(&response.content))?;
                }
            }
            OutputFormat::Html => {
                if !response.rendered.is_empty() {
                    writeln!(self.out, "{}", response.rendered.trim_end())?;
                }
            }
        }
        self.out.flush()?;

        if let Some(line) = error_line {
            writeln!(self.err, "{}", line.red())?;
        } else if let Outcome::Completed(Some(metrics)) = &response.outcome {
            writeln!(self.err, "{}", metrics.footer().dark_grey())?;
        }
        self.err.flush()
    }
}

impl<O: Write + Send, E: Write + Send> ResponseView for TerminalView<O, E> {
    fn paint(&mut self, rendered: &str) {
        if self.format != OutputFormat::Text {
            return;
        }
        if let Err(e) = self.write_delta(rendered) {
            warn!("Failed to write response: {e}");
        }
    }

    fn finish(&mut self, response: &FinalizedResponse) {
        if let Err(e) = self.write_finish(response) {
            warn!("Failed to write response: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use botvault_core::{CANCELLED_MARKER, ChatError, Metrics};

    use super::*;

    fn view(format: OutputFormat) -> TerminalView<Vec<u8>, Vec<u8>> {
        TerminalView::with_writers(Vec::new(), Vec::new(), format)
    }

    fn output(view: TerminalView<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = view.into_writers();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_text_paints_print_only_new_suffix() {
        let mut view = view(OutputFormat::Text);
        view.paint("Hel");
        view.paint("Hello, wor");
        view.paint("Hello, world");
        view.finish(&FinalizedResponse {
            content: "Hello, world".to_string(),
            rendered: "Hello, world".to_string(),
            outcome: Outcome::Completed(Some(Metrics {
                eval_count: Some(3),
                ..Metrics::default()
            })),
        });

        let (out, err) = output(view);
        assert_eq!(out, "Hello, world\n");
        assert!(err.contains("Tokens: 3"));
    }

    #[test]
    fn test_cancel_marker_is_printed_after_partial() {
        let mut view = view(OutputFormat::Text);
        view.paint("Partial");
        let content = format!("Partial{CANCELLED_MARKER}");
        view.paint(&content);
        view.finish(&FinalizedResponse {
            content: content.clone(),
            rendered: content,
            outcome: Outcome::Cancelled,
        });

        let (out, err) = output(view);
        assert!(out.starts_with("Partial\n\n_[Response cancelled by user]_"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_failure_prints_error_line() {
        let mut view = view(OutputFormat::Text);
        view.paint("");
        view.finish(&FinalizedResponse {
            content: String::new(),
            rendered: String::new(),
            outcome: Outcome::Failed(ChatError::Timeout),
        });

        let (out, err) = output(view);
        assert!(out.is_empty());
        assert!(err.contains("Error: Request timed out. Please try again."));
    }

    #[test]
    fn test_html_prints_once_at_finish() {
        let mut view = view(OutputFormat::Html);
        view.paint("<p>Hi</p>\n");
        view.finish(&FinalizedResponse {
            content: "Hi".to_string(),
            rendered: "<p>Hi</p>\n".to_string(),
            outcome: Outcome::Completed(None),
        });

        let (out, err) = output(view);
        assert_eq!(out, "<p>Hi</p>\n");
        assert!(err.is_empty());
    }

    fn failed_with_partial() -> FinalizedResponse {
        FinalizedResponse {
            content: "partial".to_string(),
            rendered: "<p>partial</p>\n".to_string(),
            outcome: Outcome::Failed(ChatError::Network("reset".to_string())),
        }
    }

    #[test]
    fn test_html_failure_prints_only_error() {
        let mut view = view(OutputFormat::Html);
        view.paint("<p>partial</p>\n");
        view.finish(&failed_with_partial());

        let (out, err) = output(view);
        assert!(out.is_empty());
        assert!(err.contains("Error: Network error occurred"));
    }

    #[test]
    fn test_markdown_failure_prints_only_error() {
        let mut view = view(OutputFormat::Markdown);
        view.paint("<p>partial</p>\n");
        view.finish(&failed_with_partial());

        let (out, err) = output(view);
        assert!(out.is_empty());
        assert!(err.contains("Error: Network error occurred"));
    }
}
