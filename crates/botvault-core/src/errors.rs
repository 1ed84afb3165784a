//! Error taxonomy of the chat pipeline.
//!
//! Every failure that can reach the caller of a send is one of these kinds.
//! Malformed stream records never appear here: the decoder recovers from them
//! locally.

use thiserror::Error;

/// Result type alias for chat pipeline operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors surfaced by the chat pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// No response headers arrived within the configured request timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established or broke mid-stream.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Http { status: u16 },

    /// The server answered 404 for the requested model.
    #[error("model '{model}' not found")]
    ModelNotFound { model: String },

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request was cancelled before it settled.
    #[error("request cancelled")]
    Cancelled,

    /// A request is already in flight.
    ///
    /// Callers are expected to prevent this by disabling input while a
    /// request is live; seeing it indicates a caller bug.
    #[error("a chat request is already in progress")]
    AlreadyInProgress,

    /// Nothing to send: no text and no attachments.
    #[error("message is empty")]
    EmptyMessage,
}

impl ChatError {
    /// Short human-readable line for display in place of message content.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => "Request timed out. Please try again.".to_string(),
            Self::Network(_) => "Network error occurred. Check your connection.".to_string(),
            Self::Http { status } => {
                format!("Failed to communicate with Ollama. Is it running? (Status: {status})")
            }
            Self::ModelNotFound { .. } => {
                "Model not found. Please select a different model.".to_string()
            }
            Self::InvalidResponse(_) => "Received an unreadable response from Ollama.".to_string(),
            Self::Cancelled => "Response cancelled by user.".to_string(),
            Self::AlreadyInProgress => "A response is still being generated.".to_string(),
            Self::EmptyMessage => "Type a message or attach a file first.".to_string(),
        }
    }

    /// Whether this error is the cooperative-cancellation outcome.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found_has_distinct_message() {
        let not_found = ChatError::ModelNotFound {
            model: "llama9".to_string(),
        };
        let generic = ChatError::Http { status: 500 };
        assert_eq!(
            not_found.user_message(),
            "Model not found. Please select a different model."
        );
        assert!(generic.user_message().contains("Status: 500"));
        assert_ne!(not_found.user_message(), generic.user_message());
    }

    #[test]
    fn test_display_includes_detail() {
        let err = ChatError::Network("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.user_message(), "Network error occurred. Check your connection.");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ChatError::Cancelled.is_cancelled());
        assert!(!ChatError::Timeout.is_cancelled());
    }
}
