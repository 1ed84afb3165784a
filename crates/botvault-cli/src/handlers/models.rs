//! Models command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::commands::OutputFormat;
use crate::error::CliError;
use crate::presentation::format_model_table;

/// List the server's models, marking the one a chat would use.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let mut session = ctx.session(OutputFormat::Text);
    let models = session.refresh_models().await.map_err(CliError::from)?;
    print!("{}", format_model_table(&models, &session.settings().model));
    Ok(())
}
