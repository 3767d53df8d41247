//! Per-call session state (§3) and the outbound sink abstraction.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use tokio::sync::{Mutex, Notify};
use tokio::task::AbortHandle;

use crate::config::GatewayConfig;
use crate::frames::StopAudioFrame;
use crate::queue::SpeechQueue;

/// Whether the outbound sink is still able to accept sends. Mirrors ACS's
/// `client_state`/`application_state` dual check from §4.4: both must be
/// connected before any send is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Connected,
    Closing,
    Closed,
}

/// Wraps a split WebSocket sink in a mutex so that the reactor (StopAudio)
/// and the turn pipeline (playback) can write concurrently without
/// interleaving frames, gated on the connected-state check.
/// Generalized from this codebase's own `WebSocketAudioSink`, which wraps
/// a binary PCM channel; this sink speaks JSON text frames with an
/// explicit state flag instead of an inferred one.
pub struct OutboundSink {
    inner: Mutex<SplitSink<WebSocket, Message>>,
    state: AtomicBool, // true == connected
}

impl OutboundSink {
    #[must_use]
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self {
            inner: Mutex::new(sink),
            state: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn state(&self) -> SinkState {
        if self.state.load(Ordering::Acquire) {
            SinkState::Connected
        } else {
            SinkState::Closing
        }
    }

    pub fn mark_closed(&self) {
        self.state.store(false, Ordering::Release);
    }

    /// Send a text frame, gated on the connected-state check. Returns
    /// `Ok(false)` without attempting a network write when the sink is no
    /// longer connected.
    pub async fn send_text(&self, text: String) -> anyhow::Result<bool> {
        if self.state() != SinkState::Connected {
            return Ok(false);
        }
        let mut guard = self.inner.lock().await;
        match guard.send(Message::Text(text)).await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.mark_closed();
                Err(e.into())
            }
        }
    }

    /// Send the fixed StopAudio control frame, honoring the connected-state check.
    pub async fn send_stop_audio(&self) -> anyhow::Result<bool> {
        self.send_text(StopAudioFrame::default().to_json()).await
    }

    /// Send a raw binary audio payload produced by the TTS helper.
    pub async fn send_binary(&self, bytes: Vec<u8>) -> anyhow::Result<bool> {
        if self.state() != SinkState::Connected {
            return Ok(false);
        }
        let mut guard = self.inner.lock().await;
        match guard.send(Message::Binary(bytes)).await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.mark_closed();
                Err(e.into())
            }
        }
    }
}

/// Session-scoped boolean flags (§3), following the shared-atomic-flag
/// idiom used elsewhere in this codebase for cross-task coordination.
#[derive(Debug, Default)]
pub struct SessionFlags {
    pub greeting_played: AtomicBool,
    pub barge_in_active: AtomicBool,
    pub stopped: AtomicBool,
}

/// In-flight audio-ingest task bookkeeping (§4.4): a cleanup-by-done-callback
/// set with no artificial concurrency cap.
#[derive(Default)]
pub struct IngestTasks {
    next_id: AtomicU64,
    inner: parking_lot::Mutex<HashSet<u64>>,
}

impl IngestTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for a newly spawned ingest task.
    pub fn insert(&self) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().insert(id);
        id
    }

    /// Remove the slot once the task completes. Called from the task's
    /// done-callback.
    pub fn remove(&self, id: u64) {
        self.inner.lock().remove(&id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bookkeeping for the single in-flight orchestrator/playback task.
/// `finished`/`done` let a canceller wait for the abort to actually land
/// without owning the `JoinHandle` that the turn pipeline is awaiting.
pub struct CurrentResponse {
    pub abort: AbortHandle,
    pub finished: Arc<AtomicBool>,
    pub done: Arc<Notify>,
}

impl CurrentResponse {
    /// Block (async) until the task this handle refers to has completed,
    /// whether normally, by error, or by cancellation.
    pub async fn await_done(&self) {
        if self.finished.load(Ordering::Acquire) {
            return;
        }
        let notified = self.done.notified();
        if self.finished.load(Ordering::Acquire) {
            return;
        }
        notified.await;
    }
}

/// Per-call session state, owned by the [`crate::controller::SessionController`]
/// and shared (via `Arc`) with the recognition worker, turn pipeline, and
/// media reactor.
pub struct SessionState {
    pub call_connection_id: String,
    pub session_id: String,
    pub greeting_text: String,
    pub outbound: Arc<OutboundSink>,
    pub flags: SessionFlags,
    pub speech_queue: Arc<SpeechQueue>,
    pub ingest_tasks: IngestTasks,
    /// Handle to the current outbound playback/orchestration task, if any.
    /// The turn pipeline awaits the underlying `JoinHandle` locally; this
    /// lets the reactor's barge-in path (or `cancelCurrent`) cancel it, and
    /// wait for the cancellation to actually land, without taking ownership
    /// of the `JoinHandle` itself.
    pub current_response: Mutex<Option<CurrentResponse>>,
}

impl SessionState {
    #[must_use]
    pub fn new(
        call_connection_id: String,
        session_id: String,
        outbound: Arc<OutboundSink>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            call_connection_id,
            session_id,
            greeting_text: config.greeting_text.clone(),
            outbound,
            flags: SessionFlags::default(),
            speech_queue: Arc::new(SpeechQueue::new(config.queue_capacity)),
            ingest_tasks: IngestTasks::new(),
            current_response: Mutex::new(None),
        }
    }
}
