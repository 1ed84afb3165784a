//! Interactive chat handler.
//!
//! A line-oriented REPL over one [`ChatSession`]. Plain lines are sent as
//! messages; lines starting with `/` are commands that stage attachments or
//! adjust the session. Ctrl+C while a reply streams cancels that reply and
//! keeps the session alive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use botvault_core::{AttachmentKind, ChatSession, Message, MessageRole};

use crate::attachments::{MAX_ATTACHMENTS, load_attachment};
use crate::bootstrap::CliContext;
use crate::commands::OutputFormat;
use crate::handlers::spawn_interrupt_watcher;
use crate::presentation::{TerminalView, format_model_table};

const HELP: &str = "\
Commands:
  /attach <path>     Stage a file for the next message
  /detach <name>     Remove a staged file
  /files             List staged files
  /models            List models on the server
  /model [name]      Show or switch the model
  /temp [value]      Show or set the temperature (0.0-2.0)
  /role [user|system] Show or set the role for your messages
  /stream [on|off]   Show or toggle streaming
  /reset             Start a new conversation
  /help              Show this help
  /quit              Exit
Press Ctrl+C while a reply is streaming to cancel it.";

#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    Help,
    Quit,
    Reset,
    Attach(PathBuf),
    Detach(String),
    Files,
    Models,
    Model(Option<String>),
    Temperature(Option<f32>),
    Role(Option<MessageRole>),
    Stream(Option<bool>),
}

#[derive(Debug, Clone, PartialEq)]
enum ReplInput {
    Empty,
    Message(String),
    Command(ReplCommand),
}

/// Parse one line of REPL input.
fn parse_input(line: &str) -> Result<ReplInput, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(ReplInput::Empty);
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(ReplInput::Message(line.to_string()));
    };

    let (name, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(n, a)| (n, a.trim()));
    let arg = (!arg.is_empty()).then_some(arg);

    let command = match (name, arg) {
        ("help" | "?", _) => ReplCommand::Help,
        ("quit" | "exit" | "q", _) => ReplCommand::Quit,
        ("reset" | "new", _) => ReplCommand::Reset,
        ("files", _) => ReplCommand::Files,
        ("models", _) => ReplCommand::Models,
        ("attach", Some(path)) => ReplCommand::Attach(PathBuf::from(path)),
        ("attach", None) => return Err("Usage: /attach <path>".to_string()),
        ("detach", Some(file)) => ReplCommand::Detach(file.to_string()),
        ("detach", None) => return Err("Usage: /detach <name>".to_string()),
        ("model", model) => ReplCommand::Model(model.map(str::to_string)),
        ("temp", None) => ReplCommand::Temperature(None),
        ("temp", Some(value)) => match value.parse::<f32>() {
            Ok(t) if (0.0..=2.0).contains(&t) => ReplCommand::Temperature(Some(t)),
            _ => return Err("Temperature must be a number between 0.0 and 2.0".to_string()),
        },
        ("role", None) => ReplCommand::Role(None),
        ("role", Some(value)) => match MessageRole::parse(value) {
            Some(role @ (MessageRole::User | MessageRole::System)) => {
                ReplCommand::Role(Some(role))
            }
            _ => return Err("Role must be 'user' or 'system'".to_string()),
        },
        ("stream", None) => ReplCommand::Stream(None),
        ("stream", Some("on")) => ReplCommand::Stream(Some(true)),
        ("stream", Some("off")) => ReplCommand::Stream(Some(false)),
        ("stream", Some(_)) => return Err("Usage: /stream [on|off]".to_string()),
        _ => return Err(format!("Unknown command '/{name}'. Type /help for commands.")),
    };
    Ok(ReplInput::Command(command))
}

struct Repl {
    session: ChatSession,
    role: MessageRole,
    system: Option<String>,
}

impl Repl {
    fn seed(&mut self) {
        if let Some(system) = &self.system {
            self.session
                .state_mut()
                .append(Message::new(MessageRole::System, system.clone()));
        }
    }

    fn prompt(&self) -> String {
        let staged = self.session.state().attachments().len();
        if staged > 0 {
            format!("{} [{staged} file(s)]> ", self.role)
        } else {
            format!("{}> ", self.role)
        }
    }

    async fn send(&mut self, text: &str) {
        let mut view = TerminalView::stdio(OutputFormat::Text);
        if let Err(err) = self.session.send(self.role, text, &mut view).await {
            eprintln!("{}", err.user_message().yellow());
        }
    }

    /// Returns `false` when the REPL should exit.
    async fn run_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Help => println!("{HELP}"),
            ReplCommand::Quit => return false,
            ReplCommand::Reset => {
                self.session.reset();
                self.seed();
                println!("Started a new conversation.");
            }
            ReplCommand::Attach(path) => {
                let staged = self.session.state().attachments();
                match load_attachment(&path, staged).await {
                    Ok(attachment) => {
                        let name = attachment.name.clone();
                        self.session.state_mut().upsert_attachment(attachment);
                        let count = self.session.state().attachments().len();
                        println!("Attached {name} ({count}/{MAX_ATTACHMENTS})");
                    }
                    Err(err) => eprintln!("{}", err.to_string().yellow()),
                }
            }
            ReplCommand::Detach(name) => {
                if self.session.state_mut().remove_attachment(&name) {
                    println!("Removed {name}");
                } else {
                    eprintln!("No staged file named {name}");
                }
            }
            ReplCommand::Files => {
                let attachments = self.session.state().attachments();
                if attachments.is_empty() {
                    println!("No files staged.");
                }
                for attachment in attachments {
                    let kind = match attachment.kind() {
                        AttachmentKind::Image => "image",
                        AttachmentKind::Text => "text",
                    };
                    println!("  {} ({kind}, {})", attachment.name, attachment.mime_type);
                }
            }
            ReplCommand::Models => match self.session.list_models().await {
                Ok(models) => print!(
                    "{}",
                    format_model_table(&models, &self.session.settings().model)
                ),
                Err(err) => eprintln!("{}", err.user_message().yellow()),
            },
            ReplCommand::Model(None) => println!("Model: {}", self.session.settings().model),
            ReplCommand::Model(Some(model)) => {
                println!("Switched to {model}");
                self.session.settings_mut().model = model;
            }
            ReplCommand::Temperature(None) => {
                println!("Temperature: {}", self.session.settings().temperature);
            }
            ReplCommand::Temperature(Some(value)) => {
                self.session.settings_mut().temperature = value;
                println!("Temperature set to {value}");
            }
            ReplCommand::Role(None) => println!("Role: {}", self.role),
            ReplCommand::Role(Some(role)) => {
                self.role = role;
                println!("Sending as {role}");
            }
            ReplCommand::Stream(None) => {
                let state = if self.session.settings().stream { "on" } else { "off" };
                println!("Streaming: {state}");
            }
            ReplCommand::Stream(Some(on)) => {
                self.session.settings_mut().stream = on;
                println!("Streaming {}", if on { "enabled" } else { "disabled" });
            }
        }
        true
    }
}

/// Execute the chat command.
pub async fn execute(ctx: &CliContext, system: Option<String>) -> Result<()> {
    let mut repl = Repl {
        session: ctx.session(OutputFormat::Text),
        role: MessageRole::User,
        system,
    };
    repl.seed();

    match repl.session.refresh_models().await {
        Ok(models) if models.is_empty() => {
            eprintln!("{}", "No models available on the server.".yellow());
        }
        Ok(_) => {}
        Err(err) => eprintln!(
            "{}",
            format!("Failed to load models: {}", err.user_message()).yellow()
        ),
    }

    let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
    let watcher = spawn_interrupt_watcher(repl.session.cancellation());

    println!(
        "Chatting with {} at {}. Type /help for commands.",
        repl.session.settings().model.as_str().bold(),
        repl.session.settings().base_url
    );

    let result = loop {
        let prompt = repl.prompt();
        let line = match tokio::task::block_in_place(|| editor.readline(&prompt)) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break Ok(()),
            Err(e) => break Err(e).context("Failed to read input"),
        };
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            debug!("Failed to record history: {e}");
        }

        match parse_input(&line) {
            Ok(ReplInput::Empty) => {
                // Attachments alone are a valid message.
                if !repl.session.state().attachments().is_empty() {
                    repl.send("").await;
                }
            }
            Ok(ReplInput::Message(text)) => repl.send(&text).await,
            Ok(ReplInput::Command(command)) => {
                if !repl.run_command(command).await {
                    break Ok(());
                }
            }
            Err(usage) => eprintln!("{}", usage.yellow()),
        }
    };

    watcher.abort();
    result
}
