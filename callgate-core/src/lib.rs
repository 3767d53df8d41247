//! Core engine for the ACS telephony voice-interaction gateway: per-call
//! session state, the recognition worker, the turn pipeline, and the media
//! reactor. The host binary (`callgate-server`) wires these into an axum
//! WebSocket handler.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_tungstenite as _;

// The gateway engine.
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod frames;
pub mod media_reactor;
pub mod queue;
pub mod recognition_worker;
pub mod registry;
pub mod session;
pub mod turn_pipeline;

pub use collaborators::{
    ConversationMemory, DashboardBroadcaster, DtmfHandler, Orchestrator, RecognitionCallbacks,
    SpeechRecognizer, TtsPlayback,
};
pub use config::GatewayConfig;
pub use controller::{SessionCollaborators, SessionController, SessionSnapshot};
pub use error::{EngineError, RegistryError};
pub use event::{SpeechEvent, SpeechEventKind};
pub use frames::InboundFrame;
pub use queue::SpeechQueue;
pub use registry::SessionRegistry;
pub use session::{OutboundSink, SessionState};
pub use turn_pipeline::{TurnPipeline, TurnState};
