//! Command handlers.
//!
//! Handlers follow the pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Build a session from the context, run it, format output for the terminal

pub mod ask;
pub mod chat;
pub mod models;

use tokio::task::JoinHandle;
use tracing::info;

use botvault_core::CancellationController;

use crate::error::CliError;

/// What a Ctrl+C outside the line editor should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// A response was streaming and has been cancelled.
    CancelledResponse,
    /// Nothing was streaming; the process should exit.
    Exit,
}

/// Cancel the in-flight response, or ask to exit when there is none.
pub fn handle_interrupt(controller: &CancellationController) -> InterruptAction {
    if controller.cancel_active() {
        InterruptAction::CancelledResponse
    } else {
        InterruptAction::Exit
    }
}

/// Watch for Ctrl+C while a handler runs.
///
/// Ctrl+C cancels the in-flight response. With nothing in flight (a
/// catalog fetch or attachment read that hangs) it exits with the SIGINT
/// code. rustyline reports Ctrl+C itself while a prompt is shown, so an
/// idle prompt never reaches this.
pub fn spawn_interrupt_watcher(controller: CancellationController) -> JoinHandle<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match handle_interrupt(&controller) {
                InterruptAction::CancelledResponse => info!("Cancelling response on Ctrl+C"),
                InterruptAction::Exit => {
                    info!("Interrupted with nothing in flight, exiting");
                    std::process::exit(CliError::Cancelled.exit_code());
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_cancels_active_request() {
        let controller = CancellationController::new();
        let token = controller.begin().unwrap();

        assert_eq!(handle_interrupt(&controller), InterruptAction::CancelledResponse);
        assert!(token.signal().is_cancelled());
    }

    #[test]
    fn test_interrupt_when_idle_exits() {
        let controller = CancellationController::new();
        assert_eq!(handle_interrupt(&controller), InterruptAction::Exit);
    }

    #[test]
    fn test_interrupt_after_request_settles_exits() {
        let controller = CancellationController::new();
        let token = controller.begin().unwrap();

        // Still streaming until the session releases the slot.
        assert_eq!(handle_interrupt(&controller), InterruptAction::CancelledResponse);
        assert_eq!(handle_interrupt(&controller), InterruptAction::CancelledResponse);

        assert!(controller.clear(&token));
        assert_eq!(handle_interrupt(&controller), InterruptAction::Exit);
    }
}
