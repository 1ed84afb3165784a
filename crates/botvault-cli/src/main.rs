//! CLI entry point - the composition root.
//!
//! Loads `.env`, parses arguments, installs logging and bootstraps the
//! context, then dispatches to a handler. Failures map to exit codes through
//! [`CliError`].

use clap::Parser;
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use botvault_cli::error::exit_code_for;
use botvault_cli::handlers::{self, ask::AskArgs};
use botvault_cli::{Cli, CliError, Commands, bootstrap};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Logs go to stderr so replies on stdout can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(cli.settings())?;

    match cli.command.unwrap_or(Commands::Chat { system: None }) {
        Commands::Chat { system } => handlers::chat::execute(&ctx, system).await,
        Commands::Ask {
            question,
            files,
            system,
            format,
        } => {
            let args = AskArgs {
                question,
                files,
                system,
                format,
            };
            handlers::ask::execute(&ctx, args).await
        }
        Commands::Models => handlers::models::execute(&ctx).await,
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        let reported = err.downcast_ref::<CliError>().is_some_and(CliError::is_reported);
        if !reported {
            eprintln!("{} {err:#}", "error:".red().bold());
        }
        std::process::exit(exit_code_for(&err));
    }
}
