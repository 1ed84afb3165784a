use botvault_core::MarkdownRenderer;

/// Identity renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl MarkdownRenderer for PlainTextRenderer {
    fn render(&self, markdown: &str) -> String {
        markdown.to_string()
    }
}
