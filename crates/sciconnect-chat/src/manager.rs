//! Conversation manager: owns every thread and routes outgoing messages.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use sciconnect_core::config::{BackgroundReplyPolicy, ChatConfig};

use crate::error::ChatError;
use crate::scheduler::ReplyScheduler;
use crate::types::{ConversationThread, Message, Sender, ThreadHandle, ThreadKey};

// =============================================================================
// ConversationManager
// =============================================================================

/// Owns the threads for every conversation context seen this session.
///
/// Threads are created lazily by `open_thread` and live as long as the
/// manager. Dropping the manager aborts all pending replies.
#[derive(Debug)]
pub struct ConversationManager {
    config: ChatConfig,
    threads: Mutex<HashMap<ThreadKey, ThreadHandle>>,
    active: Mutex<Option<ThreadKey>>,
    scheduler: ReplyScheduler,
}

impl ConversationManager {
    pub fn new(config: ChatConfig) -> Self {
        let scheduler = ReplyScheduler::new(
            Duration::from_millis(config.reply_delay_ms),
            config.acknowledgement.clone(),
        );
        Self {
            config,
            threads: Mutex::new(HashMap::new()),
            active: Mutex::new(None),
            scheduler,
        }
    }

    /// Return the thread for `key`, creating it with the greeting if needed.
    ///
    /// The opened thread becomes the active one. Under
    /// `BackgroundReplyPolicy::Suppress` the previously active thread loses
    /// its pending replies.
    pub fn open_thread(&self, key: ThreadKey) -> ThreadHandle {
        let handle = {
            let mut threads = self.threads.lock().expect("threads mutex poisoned");
            threads
                .entry(key.clone())
                .or_insert_with(|| {
                    tracing::debug!(thread = %key, "Thread created");
                    ThreadHandle::new(ConversationThread::new(key.clone(), &self.config.greeting))
                })
                .clone()
        };

        let previous = self
            .active
            .lock()
            .expect("active mutex poisoned")
            .replace(key.clone());

        if self.config.background_replies == BackgroundReplyPolicy::Suppress {
            if let Some(prev) = previous.filter(|p| *p != key) {
                self.cancel_pending(&prev);
            }
        }

        handle
    }

    /// Existing thread for `key`, without creating or activating it.
    pub fn thread(&self, key: &ThreadKey) -> Option<ThreadHandle> {
        self.threads
            .lock()
            .expect("threads mutex poisoned")
            .get(key)
            .cloned()
    }

    /// Append the user's message and queue the mock acknowledgement.
    ///
    /// Whitespace-only input changes nothing. Text is trimmed and cut to
    /// `max_message_chars`. Returns the thread contents after the append;
    /// the acknowledgement arrives later, in this same thread.
    pub fn send(&self, thread: &ThreadHandle, text: &str) -> Vec<Message> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return thread.snapshot();
        }

        let body: String = if trimmed.chars().count() > self.config.max_message_chars {
            tracing::debug!(
                limit = self.config.max_message_chars,
                "Outgoing message truncated"
            );
            trimmed.chars().take(self.config.max_message_chars).collect()
        } else {
            trimmed.to_string()
        };

        let messages = thread.append(Message::new(Sender::Me, body));
        self.scheduler.schedule(thread);
        tracing::debug!(thread = %thread.key(), len = messages.len(), "Message sent");
        messages
    }

    /// `send` addressed by key. The thread must already be open.
    pub fn send_to(&self, key: &ThreadKey, text: &str) -> Result<Vec<Message>, ChatError> {
        let thread = self
            .thread(key)
            .ok_or_else(|| ChatError::ThreadNotFound(key.clone()))?;
        Ok(self.send(&thread, text))
    }

    /// Drop the replies still queued for `key`. Returns how many were dropped.
    pub fn cancel_pending(&self, key: &ThreadKey) -> usize {
        match self.thread(key) {
            Some(thread) => self.scheduler.cancel(thread.id()),
            None => 0,
        }
    }

    pub fn pending_replies(&self, key: &ThreadKey) -> usize {
        self.thread(key)
            .map(|t| self.scheduler.pending(t.id()))
            .unwrap_or(0)
    }

    pub fn active_key(&self) -> Option<ThreadKey> {
        self.active.lock().expect("active mutex poisoned").clone()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().expect("threads mutex poisoned").len()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }
}

// =============================================================================
// Tests
// =============================================================================
