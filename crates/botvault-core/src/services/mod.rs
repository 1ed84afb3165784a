//! Services: the stateful parts of the chat pipeline.

pub mod accumulator;
pub mod cancellation;
pub mod chat_session;
pub mod conversation;

pub use accumulator::{RenderScheduler, RenderState, ResponseAccumulator};
pub use cancellation::{CancellationController, RequestToken};
pub use chat_session::{ChatSession, select_model};
pub use conversation::{ConversationState, compose_message};
