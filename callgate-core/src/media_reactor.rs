//! Media Reactor (C4) — parses inbound WebSocket frames, feeds audio into
//! the recognizer, emits the greeting, and handles barge-in.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::collaborators::DtmfHandler;
use crate::config::GatewayConfig;
use crate::event::{trimmed_char_count, SpeechEvent};
use crate::frames::InboundFrame;
use crate::recognition_worker::RecognitionWorkerHandle;
use crate::session::SessionState;
use crate::turn_pipeline::TurnPipeline;

/// Owns frame parsing and barge-in control for one session.
pub struct MediaReactor {
    session: Arc<SessionState>,
    recognizer: Arc<RecognitionWorkerHandle>,
    turn_pipeline: Arc<TurnPipeline>,
    dtmf: Option<Arc<dyn DtmfHandler>>,
    config: GatewayConfig,
}

impl MediaReactor {
    #[must_use]
    pub fn new(
        session: Arc<SessionState>,
        recognizer: Arc<RecognitionWorkerHandle>,
        turn_pipeline: Arc<TurnPipeline>,
        dtmf: Option<Arc<dyn DtmfHandler>>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            session,
            recognizer,
            turn_pipeline,
            dtmf,
            config,
        }
    }

    /// Parse one inbound text frame and dispatch it. Malformed JSON or an
    /// unrecognized `kind` is logged and dropped (§7 kind 1).
    pub async fn handle_frame(self: &Arc<Self>, raw: &str) {
        let frame: InboundFrame = match serde_json::from_str(raw) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed inbound frame");
                return;
            }
        };

        match frame {
            InboundFrame::AudioMetadata { .. } => self.handle_audio_metadata().await,
            InboundFrame::AudioData { audio_data } => {
                if audio_data.silent {
                    return;
                }
                self.spawn_audio_ingest(audio_data.data).await;
            }
            InboundFrame::DtmfData { dtmf_data } => {
                tracing::info!(digit = %dtmf_data.data, "DTMF tone received");
                if let Some(handler) = &self.dtmf {
                    handler.on_dtmf(&self.session.call_connection_id, &dtmf_data.data);
                }
            }
        }
    }

    async fn handle_audio_metadata(self: &Arc<Self>) {
        if self
            .session
            .flags
            .greeting_played
            .swap(true, Ordering::AcqRel)
        {
            tracing::debug!("ignoring repeated AudioMetadata frame");
            return;
        }

        if let Err(e) = self.recognizer.start(self.callbacks()).await {
            tracing::warn!(error = %e, "failed to start recognizer on AudioMetadata");
        }

        if !self.session.greeting_text.is_empty() {
            let event = SpeechEvent::greeting(self.session.greeting_text.clone());
            self.session.speech_queue.push(event);
        }
    }

    /// Build the callback set the recognition worker fires on its dedicated
    /// thread. Captures just enough to schedule barge-in / enqueue events
    /// without the callback itself ever blocking.
    fn callbacks(self: &Arc<Self>) -> Arc<dyn crate::collaborators::RecognitionCallbacks> {
        Arc::new(ReactorCallbacks {
            runtime: tokio::runtime::Handle::current(),
            reactor: self.clone(),
            partial_threshold: self.config.barge_in_partial_threshold,
            final_min_length: self.config.final_min_length,
        })
    }

    async fn spawn_audio_ingest(&self, base64_payload: String) {
        let recognizer = self.recognizer.clone();
        let ingest_tasks = &self.session.ingest_tasks;
        let timeout = self.config.audio_write_timeout;

        let bytes = match BASE64.decode(base64_payload.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "dropping AudioData frame with invalid base64");
                return;
            }
        };

        let id = ingest_tasks.insert();
        let session = self.session.clone();

        tokio::spawn(async move {
            if let Err(e) = recognizer.write_bytes(bytes, timeout).await {
                tracing::warn!(error = %e, "audio ingest task failed");
            }
            session.ingest_tasks.remove(id);
        });
    }

    /// The interruption entry point (§4.4). Coalesces re-entrant calls
    /// within the debounce window.
    pub async fn handle_barge_in(self: &Arc<Self>) {
        if self
            .session
            .flags
            .barge_in_active
            .swap(true, Ordering::AcqRel)
        {
            return; // already handling a barge-in; coalesce
        }

        self.turn_pipeline.cancel_current().await;

        if self.session.outbound.state() == crate::session::SinkState::Connected {
            match self.session.outbound.send_stop_audio().await {
                Ok(true) => {}
                Ok(false) => tracing::debug!("skipped StopAudio send; sink not connected"),
                Err(e) => tracing::warn!(error = %e, "failed to send StopAudio frame"),
            }
        }

        let flags = self.session.clone();
        let debounce = self.config.barge_in_debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            flags.flags.barge_in_active.store(false, Ordering::Release);
        });
    }
}

struct ReactorCallbacks {
    runtime: tokio::runtime::Handle,
    reactor: Arc<MediaReactor>,
    partial_threshold: usize,
    final_min_length: usize,
}

impl crate::collaborators::RecognitionCallbacks for ReactorCallbacks {
    fn on_partial(&self, text: &str, _language: Option<&str>) {
        if trimmed_char_count(text) <= self.partial_threshold {
            return;
        }

        // Fired from the recognizer's dedicated thread: schedule the
        // barge-in onto the async runtime rather than awaiting here.
        let reactor = self.reactor.clone();
        self.runtime.spawn(async move {
            reactor.handle_barge_in().await;
        });
    }

    fn on_final(&self, text: &str, language: Option<&str>) {
        if trimmed_char_count(text) <= self.final_min_length {
            return;
        }
        let event = SpeechEvent::final_result(text, language.map(str::to_string));
        let outcome = self.reactor.session.speech_queue.push(event);
        if outcome.rejected {
            tracing::warn!("speech queue full; dropped final result");
        } else if outcome.dropped > 0 {
            tracing::warn!(dropped = outcome.dropped, "speech queue overflow; dropped oldest events");
        }
    }

    fn on_error(&self, message: &str) {
        let event = SpeechEvent::error(message);
        self.reactor.session.speech_queue.push(event);
    }
}
