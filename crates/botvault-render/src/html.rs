//! Markdown to display-safe HTML.
//!
//! Raw HTML in model output is never passed through: block and inline HTML
//! are re-emitted as escaped text. Links are rewritten so that anything
//! pointing off the local machine carries the `external-link` class, which
//! the view intercepts instead of navigating.

use std::fmt::Write as _;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use tracing::debug;

use botvault_core::MarkdownRenderer;

/// Class added to links that leave the local machine.
pub const EXTERNAL_LINK_CLASS: &str = "external-link";

const EXTERNAL_LINK_TITLE: &str =
    "Click to copy this link (external links are not opened)";

const LOCAL_PREFIXES: [&str; 2] = ["http://localhost", "http://127.0.0.1"];

/// Schemes that can execute code when followed.
const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Renders GitHub-flavoured markdown to sanitized HTML.
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer {
    options: Options,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        Self { options }
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkdownRenderer for HtmlRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options).map(sanitize_event);
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        // Escaped by the writer.
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            dest_url, title, ..
        }) => Event::InlineHtml(CowStr::from(open_anchor(&dest_url, &title))),
        Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

/// Build the opening `<a>` tag for a link destination.
fn open_anchor(dest: &str, title: &str) -> String {
    let mut tag = String::from("<a href=\"");
    if is_blocked(dest) {
        debug!(dest = %dest, "Neutralized unsafe link target");
        tag.push('#');
    } else {
        escape_attr(&mut tag, dest);
    }
    tag.push('"');

    if is_local(dest) {
        if !title.is_empty() {
            tag.push_str(" title=\"");
            escape_attr(&mut tag, title);
            tag.push('"');
        }
    } else {
        let _ = write!(
            tag,
            " class=\"{EXTERNAL_LINK_CLASS}\" title=\"{EXTERNAL_LINK_TITLE}\""
        );
    }
    tag.push('>');
    tag
}

fn neutralize(dest: CowStr<'_>) -> CowStr<'_> {
    if is_blocked(&dest) {
        debug!(dest = %dest, "Neutralized unsafe image source");
        CowStr::Borrowed("")
    } else {
        dest
    }
}

fn is_local(dest: &str) -> bool {
    LOCAL_PREFIXES.iter().any(|prefix| dest.starts_with(prefix))
}

fn is_blocked(dest: &str) -> bool {
    // Browsers ignore leading whitespace and control characters in hrefs.
    let normalized: String = dest
        .trim_start_matches(|c: char| c.is_whitespace() || c.is_control())
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}
