//! Integration tests for the gateway's HTTP surface: the liveness probe
//! and the three `/tts/dedicated/*` endpoints (§6), driven through the
//! real router via `tower::ServiceExt::oneshot` rather than a live socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use callgate_core::{GatewayConfig, SessionRegistry};
use callgate_server::collaborators::{NullOrchestrator, NullTtsPlayback};
use callgate_server::sse::SseBroadcaster;
use callgate_server::{create_router, CorsConfig, GatewayContext};

fn test_context() -> GatewayContext {
    GatewayContext {
        sessions: Arc::new(SessionRegistry::new()),
        config: GatewayConfig::with_defaults(),
        orchestrator: Some(Arc::new(NullOrchestrator)),
        tts: Arc::new(NullTtsPlayback),
        memory: None,
        dtmf: None,
        dashboard: Arc::new(SseBroadcaster::with_defaults()),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn liveness_returns_ok_with_no_session_state() {
    let app = create_router(test_context(), &CorsConfig::AllowAll);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_reports_zero_sessions_when_idle() {
    let app = create_router(test_context(), &CorsConfig::AllowAll);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/tts/dedicated/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["active_sessions"], 0);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["session_awareness"], serde_json::json!([]));
}

#[tokio::test]
async fn status_endpoint_responds_ok_within_its_timeout() {
    let app = create_router(test_context(), &CorsConfig::AllowAll);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/tts/dedicated/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_i64());
}

#[tokio::test]
async fn metrics_endpoint_reports_zero_totals_when_idle() {
    let app = create_router(test_context(), &CorsConfig::AllowAll);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/tts/dedicated/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["active_sessions"], 0);
    assert_eq!(json["allocations_total"], 0);
    assert_eq!(json["allocations_cached"], 0);
    assert_eq!(json["allocations_new"], 0);
}

#[tokio::test]
async fn unknown_route_yields_not_found() {
    let app = create_router(test_context(), &CorsConfig::AllowAll);
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
