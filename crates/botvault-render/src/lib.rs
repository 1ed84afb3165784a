//! Markdown renderers for botvault.
//!
//! [`HtmlRenderer`] turns an assistant response into display-safe HTML.
//! [`PlainTextRenderer`] passes text through untouched, for terminals that
//! print the raw markdown as it streams.
#![deny(unused_crate_dependencies)]

mod html;
mod plain;

pub use html::{EXTERNAL_LINK_CLASS, HtmlRenderer};
pub use plain::PlainTextRenderer;
