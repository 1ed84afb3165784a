//! CLI-specific error types and mappings.
//!
//! Maps chat, settings and attachment failures to exit codes and
//! user-facing messages.

use thiserror::Error;

use botvault_core::{ChatError, SettingsError};

use crate::attachments::AttachmentError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The chat request failed.
    #[error("{}", .0.user_message())]
    Chat(ChatError),

    /// The reply was cancelled with Ctrl+C.
    #[error("Response cancelled")]
    Cancelled,

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// A file could not be attached.
    #[error("{0}")]
    Attachment(#[from] AttachmentError),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error the response view has already shown.
    #[error(transparent)]
    Reported(Box<CliError>),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories (see sysexits.h)
    /// - 130: Interrupted by SIGINT
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Chat(ChatError::Timeout | ChatError::Network(_)) => 69, // EX_UNAVAILABLE
            Self::Chat(_) => 1,
            Self::Cancelled => 130,
            Self::Arguments(_) => 2,    // EX_USAGE
            Self::Attachment(_) => 65,  // EX_DATAERR
            Self::Io(_) => 74,          // EX_IOERR
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Reported(inner) => inner.exit_code(),
        }
    }

    /// Mark the error as already displayed.
    pub fn reported(self) -> Self {
        Self::Reported(Box::new(self))
    }

    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Reported(_))
    }
}

impl From<ChatError> for CliError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Cancelled => Self::Cancelled,
            ChatError::EmptyMessage => Self::Arguments(err.user_message()),
            other => Self::Chat(other),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error returned from a handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_errors_use_user_message() {
        let err = CliError::from(ChatError::Http { status: 500 });
        assert_eq!(
            err.to_string(),
            "Failed to communicate with Ollama. Is it running? (Status: 500)"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(ChatError::Timeout).exit_code(), 69);
        assert_eq!(CliError::from(ChatError::Cancelled).exit_code(), 130);
        assert_eq!(CliError::from(ChatError::EmptyMessage).exit_code(), 2);
        assert_eq!(CliError::from(SettingsError::EmptyModel).exit_code(), 78);
    }

    #[test]
    fn test_exit_code_through_anyhow() {
        let err = anyhow::Error::new(CliError::Cancelled);
        assert_eq!(exit_code_for(&err), 130);
        assert_eq!(exit_code_for(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_reported_keeps_exit_code() {
        let err = CliError::from(ChatError::Timeout).reported();
        assert!(err.is_reported());
        assert_eq!(err.exit_code(), 69);
        assert_eq!(err.to_string(), "Request timed out. Please try again.");
    }
}
