//! Route definitions and router construction.

use std::path::Path;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::bootstrap::{CorsConfig, GatewayContext};
use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build all gateway routes, without `.with_state()` applied.
pub(crate) fn gateway_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/:call_connection_id", get(handlers::ws::media_stream))
        .route("/events", get(dashboard_events))
        .route("/tts/dedicated/health", get(handlers::health::health))
        .route("/tts/dedicated/metrics", get(handlers::health::metrics))
        .route("/tts/dedicated/status", get(handlers::health::status))
}

async fn dashboard_events(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    state.dashboard.clone().subscribe()
}

/// Create the main Axum router.
pub fn create_router(ctx: GatewayContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .merge(gateway_routes().with_state(state).layer(cors))
}

/// Create a router with gateway routes plus static dashboard asset serving.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: GatewayContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");
    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    create_router(ctx, cors_config).fallback_service(serve_dir)
}
