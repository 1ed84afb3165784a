//! The settled result of one assistant turn.

use crate::errors::ChatError;

use super::{Message, Metrics};

/// Appended to partial content when the user cancels a response.
pub const CANCELLED_MARKER: &str = "\n\n_[Response cancelled by user]_";

/// How a streamed response ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The stream ended normally. Metrics are present only if the server sent
    /// a terminal `done` record.
    Completed(Option<Metrics>),
    /// The user cancelled mid-flight.
    Cancelled,
    /// The request or stream failed.
    Failed(ChatError),
}

impl Outcome {
    /// Metrics to show beneath the message, only for completed responses.
    #[must_use]
    pub const fn metrics(&self) -> Option<&Metrics> {
        match self {
            Self::Completed(metrics) => metrics.as_ref(),
            Self::Cancelled | Self::Failed(_) => None,
        }
    }
}

/// Final text of an assistant turn plus its outcome classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedResponse {
    /// Accumulated markdown, including the cancellation marker when cancelled.
    pub content: String,
    /// Output of the last render of `content`.
    pub rendered: String,
    pub outcome: Outcome,
}

impl FinalizedResponse {
    /// Text to display in place of the message body, if the turn failed.
    #[must_use]
    pub fn error_line(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Failed(err) => Some(format!("Error: {}", err.user_message())),
            _ => None,
        }
    }

    /// The assistant message this turn contributes to the history, if any.
    ///
    /// Failed turns contribute nothing. Completed turns contribute their
    /// content unless it is blank. Cancelled turns keep their partial content,
    /// marker included, as long as something arrived before the cancel.
    #[must_use]
    pub fn history_message(&self) -> Option<Message> {
        let kept = match &self.outcome {
            Outcome::Failed(_) => return None,
            Outcome::Completed(_) => self.content.as_str(),
            Outcome::Cancelled => self
                .content
                .strip_suffix(CANCELLED_MARKER)
                .unwrap_or(&self.content),
        };
        if kept.trim().is_empty() {
            None
        } else {
            Some(Message::assistant(self.content.clone()))
        }
    }
}
