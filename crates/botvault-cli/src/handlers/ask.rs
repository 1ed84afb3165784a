//! Ask command handler.
//!
//! One question, one reply, then exit. The exit code reflects how the reply
//! ended.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};

use botvault_core::{ChatSession, Message, MessageRole, Outcome};

use crate::attachments::load_attachment;
use crate::bootstrap::CliContext;
use crate::commands::OutputFormat;
use crate::error::CliError;
use crate::handlers::spawn_interrupt_watcher;
use crate::presentation::TerminalView;

pub struct AskArgs {
    pub question: String,
    pub files: Vec<PathBuf>,
    pub system: Option<String>,
    pub format: OutputFormat,
}

/// Execute the ask command.
pub async fn execute(ctx: &CliContext, args: AskArgs) -> Result<()> {
    let piped = read_piped_stdin()?;
    let prompt = build_prompt(&args.question, piped.as_deref());

    let mut session = ctx.session(args.format);
    if let Some(system) = args.system {
        session
            .state_mut()
            .append(Message::new(MessageRole::System, system));
    }
    stage_files(&mut session, &args.files).await?;

    let watcher = spawn_interrupt_watcher(session.cancellation());
    let mut view = TerminalView::stdio(args.format);
    let result = session.send(MessageRole::User, &prompt, &mut view).await;
    watcher.abort();

    let response = result.map_err(CliError::from)?;
    match response.outcome {
        Outcome::Completed(_) => Ok(()),
        Outcome::Cancelled => Err(CliError::Cancelled.reported().into()),
        Outcome::Failed(err) => Err(CliError::from(err).reported().into()),
    }
}

async fn stage_files(session: &mut ChatSession, files: &[PathBuf]) -> Result<(), CliError> {
    for path in files {
        let attachment = load_attachment(path, session.state().attachments()).await?;
        session.state_mut().upsert_attachment(attachment);
    }
    Ok(())
}

fn read_piped_stdin() -> Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(Some(buffer))
}

/// Combine the question with piped input.
///
/// A `{}` placeholder in the question is replaced with the input; otherwise
/// the input is given as context ahead of the question.
fn build_prompt(question: &str, piped_input: Option<&str>) -> String {
    match piped_input {
        Some(input) if !input.trim().is_empty() => {
            if question.contains("{}") {
                question.replace("{}", input)
            } else {
                format!("Context:\n{}\n\nQuestion: {question}", input.trim())
            }
        }
        _ => question.to_string(),
    }
}
