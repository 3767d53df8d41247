//! Bounded speech-event queue with a drop-oldest overflow policy.
//!
//! `tokio::sync::mpsc` has no way to inspect or drain a channel's backlog,
//! which the emergency-clear algorithm needs. This is built directly on a
//! `parking_lot::Mutex<VecDeque<_>>` guarded by a `tokio::sync::Notify` for
//! the async consumer side, the same shape as the drop-oldest policy
//! documented for `WebSocketAudioSink::append`'s audio channel elsewhere
//! in this codebase, generalized here to expose the introspection the
//! emergency clear needs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::timeout;

use crate::event::SpeechEvent;

/// Outcome of a [`SpeechQueue::push`] call, used by callers that need to log
/// overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// Number of oldest events dropped to make room for the new one.
    pub dropped: usize,
    /// Whether the new event itself was dropped (queue stayed full after
    /// the emergency clear).
    pub rejected: bool,
}

/// A single-producer/single-consumer (plus a third-context drainer) bounded
/// FIFO queue of [`SpeechEvent`]s.
pub struct SpeechQueue {
    capacity: usize,
    inner: Mutex<VecDeque<SpeechEvent>>,
    notify: Notify,
    len: AtomicUsize,
}

impl SpeechQueue {
    /// Create a queue with the given capacity (10 by default, see `GatewayConfig`).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            len: AtomicUsize::new(0),
        }
    }

    /// Current number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push an event, applying the drop-oldest overflow policy if the
    /// queue is at capacity: drop up to `min(3, size / 2)` oldest events,
    /// then retry once. If the queue is still full, the *new* event is
    /// dropped instead and `rejected` is `true`.
    pub fn push(&self, event: SpeechEvent) -> PushOutcome {
        let mut guard = self.inner.lock();
        let mut dropped = 0;

        if guard.len() >= self.capacity {
            let clear_count = std::cmp::min(3, guard.len() / 2);
            for _ in 0..clear_count {
                if guard.pop_front().is_some() {
                    dropped += 1;
                }
            }
        }

        let rejected = guard.len() >= self.capacity;
        if !rejected {
            guard.push_back(event);
        }
        self.len.store(guard.len(), Ordering::Release);
        drop(guard);

        self.notify.notify_one();
        PushOutcome { dropped, rejected }
    }

    /// Pop the oldest event without blocking. Used by the drain path in
    /// `cancelCurrent()`.
    pub fn try_pop(&self) -> Option<SpeechEvent> {
        let mut guard = self.inner.lock();
        let event = guard.pop_front();
        self.len.store(guard.len(), Ordering::Release);
        event
    }

    /// Drain every pending event, oldest-first. Returns the count drained —
    /// callers log when this is large or the queue was near capacity.
    pub fn drain(&self) -> usize {
        let mut guard = self.inner.lock();
        let count = guard.len();
        guard.clear();
        self.len.store(0, Ordering::Release);
        count
    }

    /// Wait up to `idle_timeout` for the next event. Returns `None` on
    /// timeout (the turn pipeline's loop treats this as "continue").
    pub async fn pop_timeout(&self, idle_timeout: Duration) -> Option<SpeechEvent> {
        loop {
            if let Some(event) = self.try_pop() {
                return Some(event);
            }

            let notified = self.notify.notified();
            match timeout(idle_timeout, notified).await {
                Ok(()) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evt(text: &str) -> SpeechEvent {
        SpeechEvent::final_result(text, None)
    }

    #[test]
    fn push_pop_round_trip() {
        let queue = SpeechQueue::new(10);
        let outcome = queue.push(evt("hello"));
        assert_eq!(outcome, PushOutcome { dropped: 0, rejected: false });
        assert_eq!(queue.len(), 1);

        let popped = queue.try_pop().unwrap();
        assert_eq!(popped.text, "hello");
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_oldest_and_admits_new() {
        let queue = SpeechQueue::new(10);
        for i in 0..10 {
            queue.push(evt(&i.to_string()));
        }
        assert_eq!(queue.len(), 10);

        let outcome = queue.push(evt("eleventh"));
        assert_eq!(outcome.dropped, 3);
        assert!(!outcome.rejected);
        assert_eq!(queue.len(), 8);

        // The three oldest ("0", "1", "2") are gone.
        let first = queue.try_pop().unwrap();
        assert_eq!(first.text, "3");
    }

    #[test]
    fn small_queue_clears_half_and_retries() {
        let queue = SpeechQueue::new(2);
        queue.push(evt("a"));
        queue.push(evt("b"));
        assert_eq!(queue.len(), 2);

        // size/2 = 1 oldest dropped, room for the new one.
        let outcome = queue.push(evt("c"));
        assert_eq!(outcome, PushOutcome { dropped: 1, rejected: false });
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drain_removes_everything_oldest_first() {
        let queue = SpeechQueue::new(10);
        for i in 0..5 {
            queue.push(evt(&i.to_string()));
        }
        let drained = queue.drain();
        assert_eq!(drained, 5);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn pop_timeout_returns_none_when_idle() {
        let queue = SpeechQueue::new(10);
        let result = queue.pop_timeout(Duration::from_millis(20)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn pop_timeout_returns_event_once_pushed() {
        let queue = SpeechQueue::new(10);
        queue.push(evt("hi"));
        let result = queue.pop_timeout(Duration::from_millis(20)).await;
        assert_eq!(result.unwrap().text, "hi");
    }
}
