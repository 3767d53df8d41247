//! Shared application state type.
//!
//! Defines the `AppState` type used across all handlers and routers.

use std::sync::Arc;

use crate::bootstrap::GatewayContext;

/// Application state shared across all handlers.
///
/// This is an `Arc`-wrapped [`GatewayContext`] containing the session
/// registry and the collaborators shared by every call.
pub type AppState = Arc<GatewayContext>;
