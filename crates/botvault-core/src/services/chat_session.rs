//! Chat session: the streaming pipeline from draft to history.
//!
//! A send runs these steps in order:
//! 1. Claim the single request slot from the cancellation controller
//! 2. Fold the draft and pending attachments into a user message
//! 3. Hand a history snapshot to the transport
//! 4. Pull events, folding deltas into the accumulator and painting at frame
//!    boundaries while a render is pending
//! 5. Release the slot, finalize, and append the assistant reply if it is kept
//!
//! Every failure after step 1 becomes an `Outcome` on the returned response;
//! only `AlreadyInProgress` and `EmptyMessage` are returned as errors.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::{FinalizedResponse, MessageRole, ModelDescriptor, Outcome};
use crate::errors::{ChatError, ChatResult};
use crate::ports::{ChatRequest, ChatTransportPort, MarkdownRenderer, ResponseView};
use crate::settings::{ChatSettings, DEFAULT_MODEL};

use super::accumulator::ResponseAccumulator;
use super::cancellation::{CancellationController, RequestToken};
use super::conversation::ConversationState;

/// One conversation with one model server.
pub struct ChatSession {
    transport: Arc<dyn ChatTransportPort>,
    renderer: Arc<dyn MarkdownRenderer>,
    settings: ChatSettings,
    state: ConversationState,
    cancellation: CancellationController,
}

impl ChatSession {
    pub fn new(
        transport: Arc<dyn ChatTransportPort>,
        renderer: Arc<dyn MarkdownRenderer>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            transport,
            renderer,
            settings,
            state: ConversationState::new(),
            cancellation: CancellationController::new(),
        }
    }

    pub const fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub const fn settings_mut(&mut self) -> &mut ChatSettings {
        &mut self.settings
    }

    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Mutable access for staging attachments.
    pub const fn state_mut(&mut self) -> &mut ConversationState {
        &mut self.state
    }

    /// A handle that can cancel the in-flight request from elsewhere.
    pub fn cancellation(&self) -> CancellationController {
        self.cancellation.clone()
    }

    /// Cancel the in-flight request, if any.
    pub fn cancel(&self) -> bool {
        self.cancellation.cancel_active()
    }

    /// Start a fresh conversation.
    pub fn reset(&mut self) {
        info!("Resetting conversation");
        self.state.reset();
    }

    /// Fetch the model catalog.
    pub async fn list_models(&self) -> ChatResult<Vec<ModelDescriptor>> {
        self.transport.list_models().await
    }

    /// Fetch the catalog and pick a model from it.
    ///
    /// Keeps the configured model when the server has it, otherwise prefers
    /// the default model, otherwise the first listed. An empty catalog leaves
    /// the configured model unchanged.
    pub async fn refresh_models(&mut self) -> ChatResult<Vec<ModelDescriptor>> {
        let models = self.list_models().await?;
        if let Some(name) = select_model(&models, &self.settings.model) {
            if name != self.settings.model {
                info!(model = %name, "Selected model from catalog");
                self.settings.model = name;
            }
        }
        Ok(models)
    }

    /// Send a message and stream the reply into `view`.
    pub async fn send(
        &mut self,
        role: MessageRole,
        text: &str,
        view: &mut dyn ResponseView,
    ) -> ChatResult<FinalizedResponse> {
        let token = self.cancellation.begin()?;
        let Some(message) = self.state.take_draft(role, text) else {
            self.cancellation.clear(&token);
            return Err(ChatError::EmptyMessage);
        };
        self.state.append(message);

        let request = ChatRequest::from_settings(&self.settings, self.state.snapshot_history());
        info!(
            model = %request.model,
            messages = request.messages.len(),
            streaming = request.stream,
            "Sending chat request"
        );

        let mut accumulator =
            ResponseAccumulator::new(Arc::clone(&self.renderer), self.settings.min_render_interval());
        let outcome = self.drive(&request, &token, &mut accumulator, view).await;
        if !self.cancellation.clear(&token) {
            warn!(request_id = token.id(), "Request slot was released while streaming");
        }

        match &outcome {
            Outcome::Completed(_) => debug!(request_id = token.id(), "Response completed"),
            Outcome::Cancelled => info!(request_id = token.id(), "Response cancelled"),
            Outcome::Failed(err) => warn!(request_id = token.id(), error = %err, "Response failed"),
        }

        let response = accumulator.finalize(outcome, view);
        if let Some(reply) = response.history_message() {
            self.state.append(reply);
        }
        Ok(response)
    }

    /// Run the request and consume its stream until it settles.
    async fn drive(
        &self,
        request: &ChatRequest,
        token: &RequestToken,
        accumulator: &mut ResponseAccumulator,
        view: &mut dyn ResponseView,
    ) -> Outcome {
        let cancel = token.signal();

        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ChatError::Cancelled),
            result = self.transport.send_chat(request, cancel) => result,
        };
        let mut events = match sent {
            Ok(events) => events,
            Err(err) => return outcome_from_error(err),
        };

        let mut frames = tokio::time::interval(self.settings.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut metrics = None;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => return Outcome::Cancelled,

                _ = frames.tick(), if accumulator.render_pending() => {
                    accumulator.paint(Instant::now(), view);
                }

                next = events.next() => match next {
                    Some(Ok(event)) => {
                        if let Some(done) = accumulator.on_event(event, Instant::now()) {
                            metrics = Some(done);
                        }
                    }
                    Some(Err(err)) => return outcome_from_error(err),
                    None => return Outcome::Completed(metrics),
                },
            }
        }
    }
}

fn outcome_from_error(err: ChatError) -> Outcome {
    if err.is_cancelled() {
        Outcome::Cancelled
    } else {
        Outcome::Failed(err)
    }
}

/// Choose which catalog model to use.
pub fn select_model(models: &[ModelDescriptor], current: &str) -> Option<String> {
    let has = |name: &str| models.iter().any(|m| m.name == name);
    if has(current) {
        return Some(current.to_string());
    }
    if has(DEFAULT_MODEL) {
        return Some(DEFAULT_MODEL.to_string());
    }
    models.first().map(|m| m.name.clone())
}
