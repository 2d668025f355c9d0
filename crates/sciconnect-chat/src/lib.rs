//! Conversation threads for SciConnect.
//!
//! Provides per-context message threads, the append-only message log, and a
//! mock responder that acknowledges each outgoing message after a delay.

pub mod error;
pub mod manager;
pub mod scheduler;
pub mod types;

pub use error::ChatError;
pub use manager::ConversationManager;
pub use scheduler::ReplyScheduler;
pub use types::{ConversationThread, Message, Sender, ThreadHandle, ThreadKey, ThreadState};
