//! Conversation state: the history, the pending attachments, nothing else.
//!
//! This is the single source of truth for what will be sent on the next
//! request. Mutations are plain `&mut self` methods; the owner decides how
//! the state is shared.

use tracing::debug;

use crate::domain::{Attachment, AttachmentPayload, Message, MessageRole};

/// Ordered history plus the set of staged attachments.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    history: Vec<Message>,
    attachments: Vec<Attachment>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the end of the history.
    pub fn append(&mut self, message: Message) {
        debug!(role = %message.role, len = message.content.len(), "Appending message");
        self.history.push(message);
    }

    /// Read-only view of the history in conversation order.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Owned copy of the history, for building a request.
    pub fn snapshot_history(&self) -> Vec<Message> {
        self.history.clone()
    }

    /// Clear history and pending attachments.
    pub fn reset(&mut self) {
        self.history = Vec::new();
        self.attachments = Vec::new();
    }

    /// Stage an attachment, replacing any existing one with the same name.
    ///
    /// Replacement keeps the original position in the pending list.
    pub fn upsert_attachment(&mut self, attachment: Attachment) {
        if let Some(existing) = self
            .attachments
            .iter_mut()
            .find(|a| a.name == attachment.name)
        {
            debug!(name = %attachment.name, "Replacing pending attachment");
            *existing = attachment;
        } else {
            debug!(name = %attachment.name, "Adding pending attachment");
            self.attachments.push(attachment);
        }
    }

    /// Remove a pending attachment by name. Returns whether one was removed.
    pub fn remove_attachment(&mut self, name: &str) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|a| a.name != name);
        before != self.attachments.len()
    }

    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    /// Pending attachments in staging order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Fold text and the pending attachments into a message, then clear them.
    ///
    /// Returns `None` when there is neither text nor an attachment to send.
    pub fn take_draft(&mut self, role: MessageRole, text: &str) -> Option<Message> {
        let text = text.trim();
        if text.is_empty() && self.attachments.is_empty() {
            return None;
        }
        let attachments = std::mem::take(&mut self.attachments);
        Some(compose_message(role, text, &attachments))
    }
}

/// Build an outgoing message from text and attachments.
///
/// Text files are appended to the content under a `--- File: <name> ---`
/// header; images go to `images` in attachment order.
pub fn compose_message(role: MessageRole, text: &str, attachments: &[Attachment]) -> Message {
    let mut content = text.to_string();
    let mut images = Vec::new();

    for attachment in attachments {
        match &attachment.payload {
            AttachmentPayload::Text { content: body } => {
                content.push_str("\n\n--- File: ");
                content.push_str(&attachment.name);
                content.push_str(" ---\n");
                content.push_str(body);
            }
            AttachmentPayload::Image { base64 } => images.push(base64.clone()),
        }
    }

    Message::new(role, content).with_images(images)
}
