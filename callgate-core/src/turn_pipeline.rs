//! Turn Pipeline (C3) — serializes conversation turns through the
//! orchestrator or direct playback, with cancellable in-flight turns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::collaborators::{ConversationMemory, DashboardBroadcaster, Orchestrator, TtsPlayback};
use crate::config::GatewayConfig;
use crate::event::{SpeechEvent, SpeechEventKind};
use crate::session::SessionState;

/// `Idle → Processing → (Done | Cancelled | Failed) → Idle`. Only one turn
/// is `Processing` at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Processing,
    Done,
    Cancelled,
    Failed,
}

/// Owns the dispatch loop described in §4.3. One instance per session.
pub struct TurnPipeline {
    session: Arc<SessionState>,
    orchestrator: Option<Arc<dyn Orchestrator>>,
    tts: Arc<dyn TtsPlayback>,
    memory: Option<Arc<dyn ConversationMemory>>,
    dashboard: Option<Arc<dyn DashboardBroadcaster>>,
    config: GatewayConfig,
    state: parking_lot::Mutex<TurnState>,
    stopped: AtomicBool,
}

impl TurnPipeline {
    #[must_use]
    pub fn new(
        session: Arc<SessionState>,
        orchestrator: Option<Arc<dyn Orchestrator>>,
        tts: Arc<dyn TtsPlayback>,
        memory: Option<Arc<dyn ConversationMemory>>,
        dashboard: Option<Arc<dyn DashboardBroadcaster>>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            session,
            orchestrator,
            tts,
            memory,
            dashboard,
            config,
            state: parking_lot::Mutex::new(TurnState::Idle),
            stopped: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn state(&self) -> TurnState {
        *self.state.lock()
    }

    fn set_state(&self, state: TurnState) {
        *self.state.lock() = state;
    }

    /// The dispatch loop. Runs until `stop()` is called. Intended to be
    /// driven by a single `tokio::spawn`'d task owned by the session
    /// controller.
    pub async fn run(self: Arc<Self>) {
        loop {
            if self.stopped.load(Ordering::Acquire) {
                break;
            }

            let Some(event) = self
                .session
                .speech_queue
                .pop_timeout(self.config.queue_get_timeout)
                .await
            else {
                continue; // idle timeout is normal, keep looping
            };

            match event.kind {
                SpeechEventKind::Final => self.orchestrate(event).await,
                SpeechEventKind::Greeting
                | SpeechEventKind::Announcement
                | SpeechEventKind::StatusUpdate
                | SpeechEventKind::ErrorMessage => self.direct_playback(event).await,
                SpeechEventKind::Error => {
                    tracing::warn!(text = %event.text, "ASR error event");
                }
                SpeechEventKind::Partial => {
                    debug_assert!(false, "partial events never enter the turn queue");
                }
            }
        }
    }

    async fn orchestrate(&self, event: SpeechEvent) {
        self.set_state(TurnState::Processing);

        if let Some(memory) = &self.memory {
            if let Err(e) = memory
                .record_transcript(&self.session.session_id, &event.text)
                .await
            {
                tracing::warn!(error = %e, "best-effort transcript memory write failed");
            }
        }
        if let Some(dashboard) = &self.dashboard {
            if let Err(e) = dashboard
                .broadcast_transcript(&self.session.call_connection_id, &event.text)
                .await
            {
                tracing::warn!(error = %e, "best-effort dashboard broadcast failed");
            }
        }

        let Some(orchestrator) = self.orchestrator.clone() else {
            tracing::warn!("no orchestrator configured; dropping final transcript");
            self.set_state(TurnState::Idle);
            return;
        };

        let outbound = self.session.outbound.clone();
        let call_id = self.session.call_connection_id.clone();
        let language = event.language.clone();
        let text = event.text.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = orchestrator
                .handle_turn(&text, language.as_deref(), outbound, &call_id, true)
                .await
            {
                tracing::warn!(error = %e, "orchestrator turn failed");
            }
        });

        self.run_as_current_response(handle).await;
    }

    async fn direct_playback(&self, event: SpeechEvent) {
        self.set_state(TurnState::Processing);

        let tts = self.tts.clone();
        let outbound = self.session.outbound.clone();
        let text = event.text.clone();
        let timeout = self.config.direct_playback_timeout;

        let handle = tokio::spawn(async move {
            match tokio::time::timeout(timeout, tts.speak(&text, outbound)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "direct playback failed"),
                Err(_) => tracing::warn!("direct playback timed out"),
            }
        });

        self.run_as_current_response(handle).await;
    }

    /// Installs `handle`'s abort handle into the session's current-response
    /// slot (so `cancelCurrent` can cancel it without owning it) and awaits
    /// the task locally. At most one task occupies the slot at a time,
    /// since it's only ever populated here, immediately before the single
    /// await point.
    async fn run_as_current_response(&self, handle: JoinHandle<()>) {
        let finished = Arc::new(AtomicBool::new(false));
        let done = Arc::new(tokio::sync::Notify::new());

        {
            let mut current = self.session.current_response.lock().await;
            *current = Some(crate::session::CurrentResponse {
                abort: handle.abort_handle(),
                finished: finished.clone(),
                done: done.clone(),
            });
        }

        let outcome = handle.await;
        finished.store(true, Ordering::Release);
        done.notify_one();

        {
            let mut current = self.session.current_response.lock().await;
            current.take();
        }

        match outcome {
            Ok(()) => self.set_state(TurnState::Done),
            Err(e) if e.is_cancelled() => self.set_state(TurnState::Cancelled),
            Err(_) => self.set_state(TurnState::Failed),
        }

        self.set_state(TurnState::Idle);
    }

    /// The interruption entry point (§4.3). Safe to call concurrently with
    /// `run()` and re-entrantly from the media reactor.
    pub async fn cancel_current(&self) {
        let drained = self.session.speech_queue.drain();
        let capacity = self.session.speech_queue.capacity();
        if drained > 2 || drained * 10 >= capacity * 8 {
            tracing::info!(drained, capacity, "cleared pending speech queue on barge-in");
        }

        let current = {
            let mut slot = self.session.current_response.lock().await;
            slot.take()
        };

        if let Some(current) = current {
            current.abort.abort();
            current.await_done().await;
        }

        self.set_state(TurnState::Idle);
    }

    /// Signal the dispatch loop to exit after its current iteration.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}
