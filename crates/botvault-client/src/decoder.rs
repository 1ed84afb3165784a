//! NDJSON stream decoder.
//!
//! Ollama streams newline-delimited JSON. Chunk boundaries from the network
//! never line up with record boundaries, so bytes are carried in a buffer
//! until a full line is available. Each line is decoded on its own: a line
//! that is not a valid record is counted and skipped, and decoding carries
//! on. An `{"error": ...}` record is logged and counted the same way. Only a
//! transport error ends the stream early.

use std::collections::VecDeque;
use std::fmt::Display;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use botvault_core::{ChatError, ChatResult, StreamEvent};

use crate::wire::OllamaChatChunk;

/// What woke the decoder while it was waiting for bytes.
enum Wake<T> {
    Cancelled,
    Chunk(Option<T>),
}

/// Pull-based decoder from a byte stream to [`StreamEvent`]s.
pub struct NdjsonDecoder<S> {
    stream: S,
    buf: BytesMut,
    pending: VecDeque<StreamEvent>,
    cancel: CancellationToken,
    malformed: usize,
    server_errors: usize,
    /// Upstream is exhausted or has failed; only `pending` remains.
    exhausted: bool,
    /// A terminal item (error or cancellation) has been yielded.
    terminated: bool,
}

impl<S, E> NdjsonDecoder<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    pub fn new(stream: S, cancel: CancellationToken) -> Self {
        Self {
            stream,
            buf: BytesMut::new(),
            pending: VecDeque::new(),
            cancel,
            malformed: 0,
            server_errors: 0,
            exhausted: false,
            terminated: false,
        }
    }

    /// Number of records skipped because they were not valid JSON records.
    pub const fn malformed_records(&self) -> usize {
        self.malformed
    }

    /// Number of `{"error": ...}` records the server sent mid-stream.
    pub const fn server_error_records(&self) -> usize {
        self.server_errors
    }

    /// Decode the next event.
    ///
    /// Returns `None` at end of stream. An `Err` is always the last item.
    /// Once the cancellation token fires, the next call yields
    /// `Err(ChatError::Cancelled)` even if decoded events are still queued.
    pub async fn next_event(&mut self) -> Option<ChatResult<StreamEvent>> {
        loop {
            if self.terminated {
                return None;
            }
            if self.cancel.is_cancelled() {
                return self.terminate(ChatError::Cancelled);
            }
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.exhausted {
                return None;
            }

            // A complete line is already buffered.
            if let Some(line_end) = find_newline(&self.buf) {
                let line = self.buf.split_to(line_end);
                self.decode_record(&line);
                continue;
            }

            // Need more data from upstream.
            let wake = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Wake::Cancelled,
                chunk = self.stream.next() => Wake::Chunk(chunk),
            };

            match wake {
                Wake::Cancelled => {}
                Wake::Chunk(Some(Ok(chunk))) => self.buf.extend_from_slice(&chunk),
                Wake::Chunk(Some(Err(e))) => {
                    warn!("Upstream stream error: {e}");
                    self.exhausted = true;
                    return self.terminate(ChatError::Network(e.to_string()));
                }
                Wake::Chunk(None) => {
                    self.exhausted = true;
                    // The last record may lack a trailing newline.
                    if !self.buf.is_empty() {
                        let rest = self.buf.split();
                        self.decode_record(&rest);
                    }
                    if self.malformed > 0 || self.server_errors > 0 {
                        warn!(
                            malformed = self.malformed,
                            server_errors = self.server_errors,
                            "Skipped stream records"
                        );
                    }
                }
            }
        }
    }

    fn terminate(&mut self, err: ChatError) -> Option<ChatResult<StreamEvent>> {
        self.terminated = true;
        self.pending.clear();
        Some(Err(err))
    }

    /// Decode one line into zero or more queued events.
    fn decode_record(&mut self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        match serde_json::from_str::<OllamaChatChunk>(trimmed) {
            Ok(chunk) => {
                if let Some(message) = &chunk.error {
                    self.server_errors += 1;
                    warn!(error = %message, "Server reported an error mid-stream");
                }
                self.pending.extend(chunk.into_events());
            }
            Err(e) => {
                self.malformed += 1;
                debug!(error = %e, len = trimmed.len(), "Skipping malformed stream record");
            }
        }
    }
}

impl<S, E> NdjsonDecoder<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    /// Adapt the decoder into a `Stream`.
    pub fn into_stream(self) -> impl Stream<Item = ChatResult<StreamEvent>> + Send + 'static {
        futures_util::stream::unfold(self, |mut decoder| async move {
            decoder.next_event().await.map(|item| (item, decoder))
        })
    }
}

/// Find the next newline in the buffer, returning the position after it.
fn find_newline(buf: &BytesMut) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}
