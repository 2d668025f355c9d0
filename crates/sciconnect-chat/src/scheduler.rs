//! Delayed mock replies, one responder task per thread.
//!
//! Each thread gets a FIFO of reply deadlines consumed by a single task, so
//! the acknowledgement for message N always lands before the one for N+1.
//! Responders hold a weak reference to their own thread: they never look at
//! which thread is currently shown, and they stop once the thread is gone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::types::{ConversationThread, Message, Sender, ThreadHandle, ThreadKey};

struct Responder {
    deadlines: mpsc::UnboundedSender<Instant>,
    task: JoinHandle<()>,
    pending: Arc<AtomicUsize>,
}

/// Cancellable reply tasks keyed by thread id.
pub struct ReplyScheduler {
    delay: Duration,
    text: String,
    responders: Mutex<HashMap<Uuid, Responder>>,
}

impl std::fmt::Debug for ReplyScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyScheduler")
            .field("delay", &self.delay)
            .field("text", &self.text)
            .field("responders", &self.lock().len())
            .finish()
    }
}

impl ReplyScheduler {
    pub fn new(delay: Duration, text: impl Into<String>) -> Self {
        Self {
            delay,
            text: text.into(),
            responders: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue one reply for `thread`, due `delay` from now.
    ///
    /// Must be called from within a tokio runtime; outside one the reply is
    /// skipped and `false` is returned.
    pub fn schedule(&self, thread: &ThreadHandle) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, thread = %thread.key(), "No runtime, reply skipped");
                return false;
            }
        };
        let due = Instant::now() + self.delay;
        let mut responders = self.lock();

        if let Some(responder) = responders.get(&thread.id()) {
            responder.pending.fetch_add(1, Ordering::SeqCst);
            if responder.deadlines.send(due).is_ok() {
                return true;
            }
            // The responder already exited; replace it below.
            responders.remove(&thread.id());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(1));
        // The receiver is alive until the task below is spawned.
        let _ = tx.send(due);
        let task = runtime.spawn(respond(
            thread.downgrade(),
            thread.key().clone(),
            rx,
            self.text.clone(),
            Arc::clone(&pending),
        ));
        responders.insert(
            thread.id(),
            Responder {
                deadlines: tx,
                task,
                pending,
            },
        );
        true
    }

    /// Replies queued for a thread and not yet delivered.
    pub fn pending(&self, thread_id: Uuid) -> usize {
        self.lock()
            .get(&thread_id)
            .map(|r| r.pending.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Abort every pending reply for a thread. Returns how many were dropped.
    pub fn cancel(&self, thread_id: Uuid) -> usize {
        match self.lock().remove(&thread_id) {
            Some(responder) => {
                responder.task.abort();
                let dropped = responder.pending.load(Ordering::SeqCst);
                tracing::debug!(%thread_id, dropped, "Pending replies cancelled");
                dropped
            }
            None => 0,
        }
    }

    /// Abort all responders.
    pub fn cancel_all(&self) {
        for (_, responder) in self.lock().drain() {
            responder.task.abort();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Responder>> {
        self.responders.lock().expect("responder mutex poisoned")
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn respond(
    thread: Weak<Mutex<ConversationThread>>,
    key: ThreadKey,
    mut deadlines: mpsc::UnboundedReceiver<Instant>,
    text: String,
    pending: Arc<AtomicUsize>,
) {
    while let Some(due) = deadlines.recv().await {
        tokio::time::sleep_until(due).await;
        pending.fetch_sub(1, Ordering::SeqCst);

        let Some(shared) = thread.upgrade() else {
            tracing::debug!(thread = %key, "Thread discarded, reply dropped");
            return;
        };
        let Ok(mut guard) = shared.lock() else {
            tracing::warn!(thread = %key, "Thread lock poisoned, responder stopped");
            return;
        };
        guard.push(Message::new(Sender::Other, text.clone()));
        tracing::trace!(thread = %key, len = guard.messages().len(), "Reply delivered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(600);

    fn handle() -> ThreadHandle {
        ThreadHandle::new(ConversationThread::new(ThreadKey::General, "greeting"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_delay() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();

        assert!(scheduler.schedule(&thread));
        assert_eq!(scheduler.pending(thread.id()), 1);

        tokio::time::sleep(Duration::from_millis(599)).await;
        assert_eq!(thread.len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(thread.len(), 2);
        assert_eq!(thread.snapshot()[1].text, "ack");
        assert_eq!(thread.snapshot()[1].sender, Sender::Other);
        assert_eq!(scheduler.pending(thread.id()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_responder_releases_thread_between_replies() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();

        scheduler.schedule(&thread);
        tokio::time::sleep(Duration::from_millis(700)).await;
        // The responder is idle on its queue, not holding the thread.
        assert!(thread.downgrade().upgrade().unwrap().try_lock().is_ok());

        scheduler.schedule(&thread);
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(thread.len(), 3);
        assert_eq!(scheduler.pending(thread.id()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_are_fifo_per_thread() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();

        scheduler.schedule(&thread);
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.schedule(&thread);
        assert_eq!(scheduler.pending(thread.id()), 2);

        // First reply due at 600, second at 700.
        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(thread.len(), 2);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(thread.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_replies() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();

        scheduler.schedule(&thread);
        scheduler.schedule(&thread);
        assert_eq!(scheduler.cancel(thread.id()), 2);
        assert_eq!(scheduler.pending(thread.id()), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(thread.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_cancel_starts_new_responder() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();

        scheduler.schedule(&thread);
        scheduler.cancel(thread.id());
        scheduler.schedule(&thread);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(thread.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_discarded_thread_is_noop() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();
        let id = thread.id();
        let weak = thread.downgrade();

        scheduler.schedule(&thread);
        drop(thread);
        assert!(weak.upgrade().is_none());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(scheduler.pending(id), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_scheduler_aborts_replies() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();

        scheduler.schedule(&thread);
        drop(scheduler);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(thread.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threads_do_not_share_responders() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let a = handle();
        let b = handle();

        scheduler.schedule(&a);
        scheduler.cancel(b.id());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_schedule_outside_runtime_is_skipped() {
        let scheduler = ReplyScheduler::new(DELAY, "ack");
        let thread = handle();
        assert!(!scheduler.schedule(&thread));
        assert_eq!(scheduler.pending(thread.id()), 0);
    }
}
