//! Session Controller (C1) — the composition root for one call.
//!
//! Owns the session state, the recognition worker thread, the turn
//! pipeline's dispatch task, and the media reactor, and gives the host a
//! single `start`/`handle_media`/`stop`/`snapshot` surface. Grounded on the
//! teacher's `VoiceService`, which plays the same per-session composition
//! role for the local capture/playback pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::collaborators::{
    ConversationMemory, DashboardBroadcaster, DtmfHandler, Orchestrator, SpeechRecognizer,
    TtsPlayback,
};
use crate::config::GatewayConfig;
use crate::error::EngineError;
use crate::media_reactor::MediaReactor;
use crate::recognition_worker::RecognitionWorkerHandle;
use crate::registry::SessionRegistry;
use crate::session::{OutboundSink, SessionState};
use crate::turn_pipeline::TurnPipeline;

/// A read-only view of a session's lifecycle state, returned by
/// [`SessionController::snapshot`] for health/status endpoints (§6).
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub call_connection_id: String,
    pub session_id: String,
    pub started: bool,
    pub stopped: bool,
    pub greeting_played: bool,
    pub barge_in_active: bool,
    pub queued_events: usize,
    pub pending_ingest_tasks: usize,
}

/// The external collaborators a session needs wired in before it can run.
/// Bundled so `SessionController::new` doesn't take an unreadable pile of
/// positional arguments.
pub struct SessionCollaborators {
    pub orchestrator: Option<Arc<dyn Orchestrator>>,
    pub tts: Arc<dyn TtsPlayback>,
    pub memory: Option<Arc<dyn ConversationMemory>>,
    pub dashboard: Option<Arc<dyn DashboardBroadcaster>>,
    pub dtmf: Option<Arc<dyn DtmfHandler>>,
}

/// Owns the full lifecycle of one call's engine (§4.1). Constructed once
/// per WebSocket connection and registered with a [`SessionRegistry`] for
/// the duration of the call.
pub struct SessionController {
    session: Arc<SessionState>,
    recognizer: Arc<RecognitionWorkerHandle>,
    turn_pipeline: Arc<TurnPipeline>,
    reactor: Arc<MediaReactor>,
    config: GatewayConfig,
    started: AtomicBool,
    stopped: AtomicBool,
    turn_pipeline_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    /// Build the engine for one call. `build_recognizer` constructs the
    /// (likely native, `!Send`) ASR source on its own dedicated thread.
    ///
    /// Creates the ASR audio sink here, before `start` registers the
    /// session or admits any media frame, so no audio is lost at session
    /// start.
    pub async fn new(
        call_connection_id: String,
        session_id: String,
        outbound: Arc<OutboundSink>,
        build_recognizer: impl FnOnce() -> Box<dyn SpeechRecognizer> + Send + 'static,
        collaborators: SessionCollaborators,
        config: GatewayConfig,
    ) -> Result<Arc<Self>, EngineError> {
        let session = Arc::new(SessionState::new(
            call_connection_id,
            session_id,
            outbound,
            &config,
        ));

        let recognizer = Arc::new(RecognitionWorkerHandle::spawn(build_recognizer)?);
        recognizer.prepare_sink().await?;

        let turn_pipeline = Arc::new(TurnPipeline::new(
            session.clone(),
            collaborators.orchestrator,
            collaborators.tts,
            collaborators.memory,
            collaborators.dashboard,
            config.clone(),
        ));

        let reactor = Arc::new(MediaReactor::new(
            session.clone(),
            recognizer.clone(),
            turn_pipeline.clone(),
            collaborators.dtmf,
            config.clone(),
        ));

        Ok(Arc::new(Self {
            session,
            recognizer,
            turn_pipeline,
            reactor,
            config,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            turn_pipeline_task: Mutex::new(None),
        }))
    }

    /// Register the session and start the turn dispatch loop (C2/C3/C4 are
    /// already constructed; this brings C3's loop to life). Idempotent.
    pub async fn start(self: &Arc<Self>, registry: &SessionRegistry) -> Result<(), EngineError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        registry
            .register(self.session.call_connection_id.clone(), self.clone())
            .await?;

        let turn_pipeline = self.turn_pipeline.clone();
        let handle = tokio::spawn(async move {
            turn_pipeline.run().await;
        });
        *self.turn_pipeline_task.lock().await = Some(handle);

        Ok(())
    }

    /// Forward one inbound text frame to the media reactor (§4.4). Never
    /// blocks on the orchestrator or TTS — those run on their own spawned
    /// tasks.
    pub async fn handle_media(self: &Arc<Self>, raw: &str) {
        self.reactor.handle_frame(raw).await;
    }

    /// Tear the session down, bounded by `config.shutdown_budget`.
    /// Idempotent: a second call is a no-op.
    pub async fn stop(self: &Arc<Self>, registry: &SessionRegistry) {
        if self.session.flags.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stopped.store(true, Ordering::Release);

        let budget = self.config.shutdown_budget;
        if tokio::time::timeout(budget, self.shutdown_inner()).await.is_err() {
            tracing::warn!(
                call_connection_id = %self.session.call_connection_id,
                "session shutdown exceeded its budget; abandoning remaining teardown"
            );
        }

        registry.deregister(self.session.call_connection_id.clone());
    }

    async fn shutdown_inner(&self) {
        self.turn_pipeline.cancel_current().await;
        self.turn_pipeline.stop();

        if let Some(handle) = self.turn_pipeline_task.lock().await.take() {
            let _ = handle.await;
        }

        let drained = self.session.speech_queue.drain();
        if drained > 0 {
            tracing::debug!(drained, "drained pending speech queue on shutdown");
        }

        self.recognizer.stop();
        self.recognizer.join(self.config.recognizer_join_timeout);

        self.session.outbound.mark_closed();
    }

    /// A read-only snapshot for health/status reporting (§6). Never blocks
    /// on network I/O.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            call_connection_id: self.session.call_connection_id.clone(),
            session_id: self.session.session_id.clone(),
            started: self.started.load(Ordering::Acquire),
            stopped: self.stopped.load(Ordering::Acquire),
            greeting_played: self.session.flags.greeting_played.load(Ordering::Acquire),
            barge_in_active: self.session.flags.barge_in_active.load(Ordering::Acquire),
            queued_events: self.session.speech_queue.len(),
            pending_ingest_tasks: self.session.ingest_tasks.len(),
        }
    }

    #[must_use]
    pub fn call_connection_id(&self) -> &str {
        &self.session.call_connection_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopRecognizer;
    impl SpeechRecognizer for NoopRecognizer {
        fn prepare_sink(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
        fn start(
            &mut self,
            _callbacks: Arc<dyn crate::collaborators::RecognitionCallbacks>,
        ) -> anyhow::Result<()> {
            Ok(())
        }
        fn write_bytes(&mut self, _pcm: &[u8]) -> anyhow::Result<()> {
            Ok(())
        }
        fn stop(&mut self) {}
    }

    struct NoopTts;
    #[async_trait::async_trait]
    impl TtsPlayback for NoopTts {
        async fn speak(&self, _text: &str, _sink: Arc<OutboundSink>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn snapshot_fields_start_at_expected_defaults() {
        // Full construction needs a live WebSocket split-sink, which this
        // crate's `OutboundSink` requires; covered by the server crate's
        // integration tests instead. This only pins down the struct shape.
        let snapshot = SessionSnapshot {
            call_connection_id: "c1".into(),
            session_id: "s1".into(),
            started: false,
            stopped: false,
            greeting_played: false,
            barge_in_active: false,
            queued_events: 0,
            pending_ingest_tasks: 0,
        };
        assert!(!snapshot.started);
        assert!(!snapshot.stopped);
    }
}
