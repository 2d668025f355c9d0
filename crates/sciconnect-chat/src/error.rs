//! Error types for the conversation layer.

use sciconnect_core::error::SciConnectError;

use crate::types::ThreadKey;

/// Errors from the conversation manager.
///
/// Empty or oversized messages are not errors; they are ignored or truncated.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("thread not opened: {0}")]
    ThreadNotFound(ThreadKey),
}

impl From<ChatError> for SciConnectError {
    fn from(err: ChatError) -> Self {
        SciConnectError::Chat(err.to_string())
    }
}
