//! Chat domain types.
//!
//! These types represent the conversation transcript and staged attachments,
//! independent of how they are sent to a model server.

use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Parse a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// Convert role to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn of the conversation.
///
/// Messages carry no identifier: their position in the history is their identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Base64-encoded images, in attachment order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl Message {
    /// Create a text-only message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Attach base64 image payloads to this message.
    #[must_use]
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Broad category of an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Text,
}

/// The content of a staged attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AttachmentPayload {
    /// Image bytes, base64-encoded without a `data:` prefix.
    Image { base64: String },
    /// Raw text content.
    Text { content: String },
}

/// A file staged by the user but not yet folded into a sent message.
///
/// `name` is unique within the pending set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub payload: AttachmentPayload,
}

impl Attachment {
    /// Create an image attachment from an already-encoded payload.
    pub fn image(name: impl Into<String>, mime_type: impl Into<String>, base64: String) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            payload: AttachmentPayload::Image { base64 },
        }
    }

    /// Create a text attachment.
    pub fn text(name: impl Into<String>, mime_type: impl Into<String>, content: String) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            payload: AttachmentPayload::Text { content },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AttachmentKind {
        match self.payload {
            AttachmentPayload::Image { .. } => AttachmentKind::Image,
            AttachmentPayload::Text { .. } => AttachmentKind::Text,
        }
    }
}

/// A model advertised by the server's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Size on disk in bytes, when reported.
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<String>,
}
