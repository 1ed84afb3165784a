//! Domain types for the chat pipeline.
//!
//! Pure data: no I/O, no transport details.

mod chat;
mod response;
mod stream;

pub use chat::{Attachment, AttachmentKind, AttachmentPayload, Message, MessageRole, ModelDescriptor};
pub use response::{CANCELLED_MARKER, FinalizedResponse, Outcome};
pub use stream::{Metrics, StreamEvent};
