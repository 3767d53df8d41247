//! Engine error types.

/// Errors that can occur in the per-call media lifecycle engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The ASR audio sink could not be created.
    #[error("failed to create ASR audio sink: {0}")]
    RecognizerInit(String),

    /// The recognition worker thread could not be spawned.
    #[error("failed to spawn recognition worker thread: {0}")]
    RecognitionThreadSpawn(String),

    /// The recognition worker thread died (channel disconnected).
    #[error("recognition worker thread is no longer running")]
    RecognitionThreadDied,

    /// The outbound sink never reached a connected state.
    #[error("outbound sink failed to connect")]
    SinkNotConnected,

    /// The session is already started.
    #[error("session is already started")]
    AlreadyStarted,

    /// The orchestrator returned an error.
    #[error("orchestrator failed: {0}")]
    Orchestrator(#[source] anyhow::Error),

    /// The TTS playback helper returned an error.
    #[error("tts playback failed: {0}")]
    Playback(#[source] anyhow::Error),

    /// Serialization/deserialization of a wire frame failed.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),

    /// Base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Session registration failed (duplicate call connection id).
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Errors returned by [`crate::registry::SessionRegistry`] operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No session is registered under the given call connection id.
    #[error("no session registered for call connection id {0}")]
    NotFound(String),

    /// A session is already registered under the given call connection id.
    #[error("a session is already registered for call connection id {0}")]
    AlreadyRegistered(String),
}
