//! Default collaborator implementations wired in when the host isn't
//! configured with a real orchestrator, TTS backend, or ASR source.
//!
//! These are treated as external collaborators out of scope for this
//! crate — only their interfaces are fixed (§1). `NullOrchestrator` and
//! friends give the gateway something safe to run against in tests and
//! in local development; a production deployment replaces them at
//! composition time in [`crate::bootstrap::bootstrap`].

use std::sync::Arc;

use async_trait::async_trait;
use callgate_core::{Orchestrator, OutboundSink, RecognitionCallbacks, SpeechRecognizer, TtsPlayback};

/// An orchestrator that logs and does nothing. Useful as a bootstrap
/// default and in tests that only exercise the engine's own concurrency
/// behavior.
#[derive(Debug, Default)]
pub struct NullOrchestrator;

#[async_trait]
impl Orchestrator for NullOrchestrator {
    async fn handle_turn(
        &self,
        transcript: &str,
        _language: Option<&str>,
        _sink: Arc<OutboundSink>,
        call_connection_id: &str,
        _is_telephony: bool,
    ) -> anyhow::Result<()> {
        tracing::debug!(%call_connection_id, %transcript, "no orchestrator configured; turn dropped");
        Ok(())
    }
}

/// A TTS playback helper that never sends audio. Sufficient for system
/// events (greeting/announcement) when no real synthesis backend is wired
/// in.
#[derive(Debug, Default)]
pub struct NullTtsPlayback;

#[async_trait]
impl TtsPlayback for NullTtsPlayback {
    async fn speak(&self, text: &str, _sink: Arc<OutboundSink>) -> anyhow::Result<()> {
        tracing::debug!(%text, "no TTS backend configured; utterance dropped");
        Ok(())
    }
}

/// A speech recognizer that accepts audio and never produces a result.
/// Exists purely so the engine's sink-creation and shutdown contracts (the
/// recognition worker's `stop`/join semantics) can be exercised without a
/// native ASR dependency.
#[derive(Debug, Default)]
pub struct NullSpeechRecognizer;

impl SpeechRecognizer for NullSpeechRecognizer {
    fn prepare_sink(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn start(&mut self, _callbacks: Arc<dyn RecognitionCallbacks>) -> anyhow::Result<()> {
        Ok(())
    }

    fn write_bytes(&mut self, _pcm: &[u8]) -> anyhow::Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}
