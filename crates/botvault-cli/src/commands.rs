//! Subcommands.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

/// How a reply is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Stream raw markdown as it arrives
    #[default]
    Text,
    /// Print the finished reply formatted for the terminal
    Markdown,
    /// Print the finished reply as sanitized HTML
    Html,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat (the default when no command is given)
    Chat {
        /// System prompt to open the conversation with
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Ask a single question and print the reply
    ///
    /// Piped stdin is used as context: it replaces a `{}` placeholder in the
    /// question, or is placed before the question when there is none.
    Ask {
        /// The question to ask
        question: String,
        /// Attach a file (repeatable; images and text files)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
        /// System prompt sent before the question
        #[arg(short, long)]
        system: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List models available on the server
    Models,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::parser::Cli;

    #[test]
    fn test_ask_with_files_and_format() {
        let cli = Cli::parse_from([
            "botvault", "ask", "What is this?", "-f", "a.png", "--file", "notes.txt", "--format",
            "html",
        ]);
        let Some(Commands::Ask {
            question,
            files,
            system,
            format,
        }) = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(question, "What is this?");
        assert_eq!(files, [PathBuf::from("a.png"), PathBuf::from("notes.txt")]);
        assert_eq!(system, None);
        assert_eq!(format, OutputFormat::Html);
    }

    #[test]
    fn test_chat_with_system_prompt() {
        let cli = Cli::parse_from(["botvault", "chat", "--system", "Be brief."]);
        assert!(matches!(
            cli.command,
            Some(Commands::Chat { system: Some(ref s) }) if s == "Be brief."
        ));
    }
}
