//! Loading files from disk as chat attachments.
//!
//! Images are sent base64-encoded in the message's `images` field; text
//! files are inlined into the message body by the conversation state.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::debug;

use botvault_core::{Attachment, AttachmentKind};

/// Maximum number of files staged for one message.
pub const MAX_ATTACHMENTS: usize = 10;

/// Maximum size of a single file.
pub const MAX_ATTACHMENT_BYTES: u64 = 100 * 1024 * 1024;

const IMAGE_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

const TEXT_TYPES: [&str; 7] = [
    "text/plain",
    "text/markdown",
    "text/csv",
    "application/json",
    "text/html",
    "text/css",
    "text/javascript",
];

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Maximum {MAX_ATTACHMENTS} files allowed")]
    TooMany,

    #[error("File size exceeds {}MB limit: {name}", MAX_ATTACHMENT_BYTES / (1024 * 1024))]
    TooLarge { name: String, size: u64 },

    #[error("File type not supported: {name}")]
    Unsupported { name: String },

    #[error("File is not valid UTF-8 text: {name}")]
    NotText { name: String },

    #[error("Failed to read file: {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Strip HTML-special and control characters from a file name.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | '\'' | '"' | '&') && !c.is_ascii_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// MIME type for a file, judged by its extension.
pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        _ => return None,
    };
    Some(mime)
}

/// Which kind of attachment a MIME type is allowed as, if any.
pub fn classify_mime_type(mime: &str) -> Option<AttachmentKind> {
    if IMAGE_TYPES.contains(&mime) {
        Some(AttachmentKind::Image)
    } else if TEXT_TYPES.contains(&mime) {
        Some(AttachmentKind::Text)
    } else {
        None
    }
}

/// Read and validate a file for staging alongside `staged`.
///
/// Re-attaching a file whose name is already staged replaces it, so it
/// does not count against the limit.
pub async fn load_attachment(
    path: &Path,
    staged: &[Attachment],
) -> Result<Attachment, AttachmentError> {
    let raw_name = path
        .file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
    let name = sanitize_file_name(&raw_name);

    let replaces = staged.iter().any(|a| a.name == name);
    if !replaces && staged.len() >= MAX_ATTACHMENTS {
        return Err(AttachmentError::TooMany);
    }

    let io_err = |source| AttachmentError::Io {
        name: name.clone(),
        source,
    };
    let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
    if size > MAX_ATTACHMENT_BYTES {
        return Err(AttachmentError::TooLarge { name, size });
    }

    let Some(mime) = guess_mime_type(path) else {
        return Err(AttachmentError::Unsupported { name });
    };
    let Some(kind) = classify_mime_type(mime) else {
        return Err(AttachmentError::Unsupported { name });
    };

    let bytes = tokio::fs::read(path).await.map_err(io_err)?;
    debug!(name = %name, mime, size, "Loaded attachment");

    match kind {
        AttachmentKind::Image => Ok(Attachment::image(name, mime, STANDARD.encode(bytes))),
        AttachmentKind::Text => match String::from_utf8(bytes) {
            Ok(content) => Ok(Attachment::text(name, mime, content)),
            Err(_) => Err(AttachmentError::NotText { name }),
        },
    }
}
