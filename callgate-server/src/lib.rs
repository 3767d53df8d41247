//! Axum host for the ACS telephony voice-interaction gateway: the WebSocket
//! media stream upgrade endpoint, session engine composition root, and
//! health/metrics/dashboard HTTP surface.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use hyper as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tokio_tungstenite as _;
#[cfg(test)]
use tower as _;

// Only used by main.rs binary.
use tracing_subscriber as _;

pub mod bootstrap;
pub mod collaborators;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

pub use bootstrap::{bootstrap, start_server, CorsConfig, GatewayContext, ServerConfig};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use state::AppState;
