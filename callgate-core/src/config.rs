//! Tunable constants for the media lifecycle engine.
//!
//! Every field here corresponds to a numeric constant fixed by the
//! concurrency and resource model: queue capacity, debounce windows,
//! per-operation timeouts, and the shutdown budget. None of these are
//! implementation details — changing them changes observable behavior
//! (barge-in latency, overflow-drop thresholds, shutdown duration).

use std::time::Duration;

/// Engine-wide configuration, loaded by the host from environment
/// variables or a config file and handed to each [`crate::controller::SessionController`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Text spoken as the first system utterance of a session. Empty
    /// string means no greeting is ever queued.
    pub greeting_text: String,

    /// Capacity of the turn pipeline's speech queue.
    pub queue_capacity: usize,

    /// Minimum trimmed-text length (exclusive) for a partial result to
    /// trigger barge-in.
    pub barge_in_partial_threshold: usize,

    /// Minimum trimmed-text length (exclusive) for a final result to be
    /// enqueued.
    pub final_min_length: usize,

    /// Debounce window after a barge-in before `bargeInActive` resets.
    pub barge_in_debounce: Duration,

    /// Bounded timeout for a single direct-playback utterance.
    pub direct_playback_timeout: Duration,

    /// Bounded timeout for a single audio-ingest chunk write.
    pub audio_write_timeout: Duration,

    /// Idle timeout on the turn queue's blocking dequeue.
    pub queue_get_timeout: Duration,

    /// Timeout when joining the recognition worker thread during shutdown.
    pub recognizer_join_timeout: Duration,

    /// Total shutdown budget for `stop()`.
    pub shutdown_budget: Duration,
}

impl GatewayConfig {
    /// Defaults matching the constants fixed by the concurrency and
    /// resource model.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            greeting_text: String::new(),
            queue_capacity: 10,
            barge_in_partial_threshold: 3,
            final_min_length: 1,
            barge_in_debounce: Duration::from_millis(100),
            direct_playback_timeout: Duration::from_secs(8),
            audio_write_timeout: Duration::from_millis(500),
            queue_get_timeout: Duration::from_secs(1),
            recognizer_join_timeout: Duration::from_secs(2),
            shutdown_budget: Duration::from_secs(3),
        }
    }

    /// Set the greeting text.
    #[must_use]
    pub fn with_greeting(mut self, text: impl Into<String>) -> Self {
        self.greeting_text = text.into();
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}
