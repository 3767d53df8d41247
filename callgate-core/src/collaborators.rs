//! Traits for the external collaborators the engine drives but does not
//! implement: the AI orchestrator, the streaming ASR source, the
//! streaming-TTS playback helper, conversation memory, and the dashboard
//! broadcaster. Implementations live in the host (the server crate, or a
//! test double) — this crate only defines the seams, following the same
//! `async-trait`-object-at-the-seam convention this codebase uses for
//! `SttBackend`/`TtsBackend`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::session::OutboundSink;

/// Invoked for a `Final` speech event. Performs whatever AI reasoning /
/// tool use is needed and streams the spoken reply back through the
/// outbound sink. Must be cancel-safe: when the returned future is
/// dropped/aborted mid-flight, any downstream I/O it started must unwind
/// without leaving the sink in an inconsistent state.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn handle_turn(
        &self,
        transcript: &str,
        language: Option<&str>,
        sink: Arc<OutboundSink>,
        call_connection_id: &str,
        is_telephony: bool,
    ) -> anyhow::Result<()>;
}

/// Streams a block of text to the caller as synthesized speech. Used for
/// system-originated turns (greeting, announcements, status updates, error
/// messages) that bypass the orchestrator entirely.
#[async_trait]
pub trait TtsPlayback: Send + Sync {
    async fn speak(&self, text: &str, sink: Arc<OutboundSink>) -> anyhow::Result<()>;
}

/// Registered callbacks the recognition worker fires on its dedicated
/// thread. Implementations must not block — see §4.2's cross-context
/// handoff contract.
pub trait RecognitionCallbacks: Send + Sync {
    fn on_partial(&self, text: &str, language: Option<&str>);
    fn on_final(&self, text: &str, language: Option<&str>);
    fn on_error(&self, message: &str);
}

/// A streaming ASR source. `write_bytes` is invoked from the reactor's
/// audio-ingest tasks; the recognizer is responsible for internally
/// serializing writes (the engine treats the sink as FIFO by contract).
pub trait SpeechRecognizer: Send {
    /// Create the audio input sink if absent. Must be callable before
    /// `start` so no audio is lost at session start.
    fn prepare_sink(&mut self) -> anyhow::Result<()>;

    /// Begin recognition, registering the given callbacks.
    fn start(&mut self, callbacks: Arc<dyn RecognitionCallbacks>) -> anyhow::Result<()>;

    /// Hand raw PCM bytes to the sink. Called on a worker; may block
    /// briefly but must return promptly (the caller enforces the 0.5 s
    /// per-chunk timeout from outside).
    fn write_bytes(&mut self, pcm: &[u8]) -> anyhow::Result<()>;

    /// Halt recognition and release native resources.
    fn stop(&mut self);
}

/// Optional per-session conversation memory. Used for best-effort
/// transcript broadcast ahead of orchestration.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    async fn record_transcript(&self, session_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Best-effort broadcaster for observability dashboards. Failures here are
/// logged and swallowed by the turn pipeline — they never fail a turn.
#[async_trait]
pub trait DashboardBroadcaster: Send + Sync {
    async fn broadcast_transcript(&self, call_connection_id: &str, text: &str) -> anyhow::Result<()>;
}

/// Forwarded DTMF tones. Registered per session by the host; does not
/// affect turn state.
pub trait DtmfHandler: Send + Sync {
    fn on_dtmf(&self, call_connection_id: &str, digit: &str);
}
