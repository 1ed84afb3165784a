//! Cancellation controller: at most one live chat request at a time.
//!
//! The controller owns a single slot. `begin` fills it, `clear` empties it,
//! and `cancel` trips the token without touching the slot. Tokens carry an id
//! so a caller resuming after an await can tell whether it still owns the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{ChatError, ChatResult};

/// Handle for one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: u64,
    token: CancellationToken,
}

impl RequestToken {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The cooperative signal threaded through transport and decoder.
    #[must_use]
    pub const fn signal(&self) -> &CancellationToken {
        &self.token
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Default)]
struct Inner {
    active: Mutex<Option<RequestToken>>,
    next_id: AtomicU64,
}

/// Enforces the one-request-at-a-time invariant.
///
/// Cheap to clone; clones share the same slot, so a UI can hold one to cancel
/// while the session holds another to run the request.
#[derive(Debug, Clone, Default)]
pub struct CancellationController {
    inner: Arc<Inner>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<RequestToken>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the slot for a new request.
    pub fn begin(&self) -> ChatResult<RequestToken> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(ChatError::AlreadyInProgress);
        }
        let token = RequestToken {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            token: CancellationToken::new(),
        };
        debug!(request_id = token.id, "Request started");
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Request cancellation. Idempotent; a settled token is a no-op.
    pub fn cancel(&self, token: &RequestToken) {
        if !token.is_cancelled() {
            debug!(request_id = token.id, "Cancelling request");
        }
        token.token.cancel();
    }

    /// Cancel whatever request is live. Returns whether one was.
    pub fn cancel_active(&self) -> bool {
        let slot = self.slot();
        slot.as_ref().is_some_and(|token| {
            self.cancel(token);
            true
        })
    }

    /// Release the slot, but only if `token` is still the one occupying it.
    pub fn clear(&self, token: &RequestToken) -> bool {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|active| active.id == token.id) {
            debug!(request_id = token.id, "Request settled");
            *slot = None;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.slot().is_some()
    }
}
