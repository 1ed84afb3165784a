//! Rendering and display ports.

use crate::domain::FinalizedResponse;

/// Converts markdown into output that is safe to show directly.
///
/// For HTML implementations "safe" means script and style injection is
/// neutralized and non-local links are tagged so a link interceptor can
/// recognise them.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Receives render output for the assistant message being streamed.
pub trait ResponseView: Send {
    /// Replace the displayed message body with freshly rendered content.
    fn paint(&mut self, rendered: &str);

    /// Called once when the turn settles, after the final paint.
    fn finish(&mut self, response: &FinalizedResponse);
}
