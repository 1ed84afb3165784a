//! Response accumulator and render scheduler.
//!
//! Deltas are folded into a running buffer as they arrive. Rendering is
//! expensive, so it is throttled: at most one render is scheduled at a time,
//! and a new one is only scheduled once `min_interval` has elapsed since the
//! last. A scheduled render reads the buffer when it runs, not when it was
//! scheduled, so no content is ever shown stale. `finalize` always renders.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::domain::{CANCELLED_MARKER, FinalizedResponse, Metrics, Outcome, StreamEvent};
use crate::ports::{MarkdownRenderer, ResponseView};

/// Whether a render is waiting for the next paint opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Scheduled,
}

/// Two-state throttle for renders.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    state: RenderState,
    last_render: Option<Instant>,
    min_interval: Duration,
}

impl RenderScheduler {
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            state: RenderState::Idle,
            last_render: None,
            min_interval,
        }
    }

    pub const fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_scheduled(&self) -> bool {
        self.state == RenderState::Scheduled
    }

    /// Ask for a render. Returns `true` if this call scheduled one.
    ///
    /// Coalesces with an already-scheduled render, and declines while the
    /// last render is younger than the minimum interval.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.state == RenderState::Scheduled {
            return false;
        }
        let due = self
            .last_render
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval);
        if due {
            self.state = RenderState::Scheduled;
        }
        due
    }

    /// Record that the scheduled render ran at `now`.
    pub fn complete(&mut self, now: Instant) {
        self.state = RenderState::Idle;
        self.last_render = Some(now);
    }
}

/// Running buffer for one assistant response.
pub struct ResponseAccumulator {
    renderer: Arc<dyn MarkdownRenderer>,
    buffer: String,
    scheduler: RenderScheduler,
    render_count: usize,
}

impl ResponseAccumulator {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>, min_interval: Duration) -> Self {
        Self {
            renderer,
            buffer: String::new(),
            scheduler: RenderScheduler::new(min_interval),
            render_count: 0,
        }
    }

    /// Fold an event into the buffer.
    ///
    /// Content deltas extend the buffer and request a render. The terminal
    /// event hands its metrics back to the caller.
    pub fn on_event(&mut self, event: StreamEvent, now: Instant) -> Option<Metrics> {
        match event {
            StreamEvent::ContentDelta(text) => {
                self.buffer.push_str(&text);
                if self.scheduler.request(now) {
                    trace!(buffered = self.buffer.len(), "Render scheduled");
                }
                None
            }
            StreamEvent::Done(metrics) => Some(metrics),
        }
    }

    /// Whether a render is waiting for a paint opportunity.
    pub fn render_pending(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    /// Run the scheduled render, if any, against the current buffer.
    pub fn paint(&mut self, now: Instant, view: &mut dyn ResponseView) {
        if !self.scheduler.is_scheduled() {
            return;
        }
        self.render_into(view);
        self.scheduler.complete(now);
    }

    fn render_into(&mut self, view: &mut dyn ResponseView) -> String {
        let rendered = self.renderer.render(&self.buffer);
        self.render_count += 1;
        view.paint(&rendered);
        rendered
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Number of renders performed so far, final render included.
    pub const fn render_count(&self) -> usize {
        self.render_count
    }

    /// Settle the response: mark cancellation, render one last time, and
    /// report the result to the view.
    pub fn finalize(mut self, outcome: Outcome, view: &mut dyn ResponseView) -> FinalizedResponse {
        if outcome == Outcome::Cancelled {
            self.buffer.push_str(CANCELLED_MARKER);
        }
        let rendered = self.render_into(view);
        let response = FinalizedResponse {
            content: self.buffer,
            rendered,
            outcome,
        };
        view.finish(&response);
        response
    }
}
