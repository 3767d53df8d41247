//! Lightweight health/metrics endpoints for the session engine (§6).
//!
//! Mirrors the original TTS pool health surface: a `health` endpoint for
//! dashboards, a `metrics` endpoint for monitoring scrapers, and a
//! `status` endpoint tuned for load-balancer probes with a hard 1 s
//! timeout so a stuck registry lock never wedges a health check. Field
//! names follow the original pool endpoint's fixed shape; this engine has
//! no allocation pool to report on, so `allocations_cached`/`allocations_new`
//! are repurposed for the closest analogue this engine has: queued speech
//! events versus freshly spawned audio-ingest tasks.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    status: &'static str,
    active_sessions: usize,
    session_awareness: Vec<String>,
    timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MetricsBody {
    active_sessions: usize,
    allocations_total: usize,
    allocations_cached: usize,
    allocations_new: usize,
    timestamp: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    status: &'static str,
    timestamp: Option<i64>,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `GET /tts/dedicated/health` — health status of the session engine.
pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let mut session_awareness = Vec::new();
    state
        .sessions
        .for_each(|id, _controller| session_awareness.push(id.to_string()))
        .await;

    Json(HealthBody {
        status: "healthy",
        active_sessions: session_awareness.len(),
        session_awareness,
        timestamp: Some(now()),
    })
}

/// `GET /tts/dedicated/metrics` — aggregate per-session counters.
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsBody> {
    let mut allocations_cached = 0usize;
    let mut allocations_new = 0usize;
    let mut active_sessions = 0usize;

    state
        .sessions
        .for_each(|_id, controller| {
            let snapshot = controller.snapshot();
            active_sessions += 1;
            allocations_cached += snapshot.queued_events;
            allocations_new += snapshot.pending_ingest_tasks;
        })
        .await;

    Json(MetricsBody {
        active_sessions,
        allocations_total: allocations_cached + allocations_new,
        allocations_cached,
        allocations_new,
        timestamp: Some(now()),
    })
}

/// `GET /tts/dedicated/status` — ultra-fast load-balancer probe, bounded
/// to 1 s regardless of registry contention.
pub async fn status(State(state): State<AppState>) -> Json<StatusBody> {
    match tokio::time::timeout(Duration::from_secs(1), state.sessions.count()).await {
        Ok(_count) => Json(StatusBody {
            status: "ok",
            timestamp: Some(now()),
        }),
        Err(_) => Json(StatusBody {
            status: "timeout",
            timestamp: None,
        }),
    }
}

/// `GET /health` — bare liveness probe, independent of session state.
pub async fn liveness() -> &'static str {
    "OK"
}
