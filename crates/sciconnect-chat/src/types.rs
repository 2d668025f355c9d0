use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Messages
// =============================================================================

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sender {
    /// The local user.
    #[serde(rename = "self")]
    Me,
    /// The counterpart: the selected expert, or the general responder.
    #[serde(rename = "other")]
    Other,
}

/// One entry in a conversation thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

// =============================================================================
// Threads
// =============================================================================

/// The conversation context a thread belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadKey {
    /// No expert selected.
    General,
    /// Thread with the expert of this id.
    Expert(String),
}

impl ThreadKey {
    pub fn for_expert(expert_id: Option<&str>) -> Self {
        match expert_id {
            Some(id) => ThreadKey::Expert(id.to_string()),
            None => ThreadKey::General,
        }
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadKey::General => f.write_str("general"),
            ThreadKey::Expert(id) => write!(f, "expert:{id}"),
        }
    }
}

/// Lifecycle of a thread. There is no deleted state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreadState {
    /// Only the seeded greeting so far.
    Fresh,
    /// The user has sent at least one message.
    Active,
}

/// Append-only message log for one conversation context.
#[derive(Debug, Clone)]
pub struct ConversationThread {
    pub id: Uuid,
    pub key: ThreadKey,
    messages: Vec<Message>,
}

impl ConversationThread {
    /// Create a thread seeded with the counterpart's greeting.
    pub fn new(key: ThreadKey, greeting: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            messages: vec![Message::new(Sender::Other, greeting)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> ThreadState {
        if self.messages.iter().any(|m| m.sender == Sender::Me) {
            ThreadState::Active
        } else {
            ThreadState::Fresh
        }
    }
}

/// Shared handle to a thread owned by a `ConversationManager`.
///
/// Cloning is cheap. The manager holds the owning reference; delayed replies
/// hold only a weak one, so they stop the moment the manager is gone.
#[derive(Debug, Clone)]
pub struct ThreadHandle {
    id: Uuid,
    key: ThreadKey,
    inner: Arc<Mutex<ConversationThread>>,
}

impl ThreadHandle {
    pub(crate) fn new(thread: ConversationThread) -> Self {
        Self {
            id: thread.id,
            key: thread.key.clone(),
            inner: Arc::new(Mutex::new(thread)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> &ThreadKey {
        &self.key
    }

    /// Copy of the messages at this instant.
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().messages().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> ThreadState {
        self.lock().state()
    }

    pub(crate) fn append(&self, message: Message) -> Vec<Message> {
        let mut thread = self.lock();
        thread.push(message);
        thread.messages().to_vec()
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<Mutex<ConversationThread>> {
        Arc::downgrade(&self.inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConversationThread> {
        self.inner.lock().expect("thread mutex poisoned")
    }
}
