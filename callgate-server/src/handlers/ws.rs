//! WebSocket upgrade handler for the ACS telephony media stream.
//!
//! `GET /ws/{call_connection_id}` upgrades the connection and hands it to a
//! fresh [`SessionController`], mirroring the lifecycle this codebase's own
//! `audio_ws` handler drives for the local voice pipeline's WS audio plane:
//! split the socket, register remote state, pump inbound frames until close,
//! then deregister.

use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures_util::StreamExt;
use uuid::Uuid;

use callgate_core::{OutboundSink, SessionCollaborators, SessionController};

use crate::collaborators::NullSpeechRecognizer;
use crate::state::AppState;

/// `GET /ws/{call_connection_id}` — the ACS media stream upgrade endpoint.
pub async fn media_stream(
    Path(call_connection_id): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_media_stream(socket, call_connection_id, state))
}

async fn handle_media_stream(
    socket: axum::extract::ws::WebSocket,
    call_connection_id: String,
    state: AppState,
) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let outbound = std::sync::Arc::new(OutboundSink::new(ws_sender));

    let session_id = Uuid::new_v4().to_string();

    let collaborators = SessionCollaborators {
        orchestrator: state.orchestrator.clone(),
        tts: state.tts.clone(),
        memory: state.memory.clone(),
        dashboard: Some(state.dashboard.clone() as std::sync::Arc<dyn callgate_core::DashboardBroadcaster>),
        dtmf: state.dtmf.clone(),
    };

    let controller = match SessionController::new(
        call_connection_id.clone(),
        session_id,
        outbound,
        || Box::new(NullSpeechRecognizer),
        collaborators,
        state.config.clone(),
    )
    .await
    {
        Ok(controller) => controller,
        Err(e) => {
            tracing::warn!(%call_connection_id, error = %e, "failed to construct session controller");
            return;
        }
    };

    if let Err(e) = controller.start(&state.sessions).await {
        tracing::warn!(%call_connection_id, error = %e, "failed to start session");
        return;
    }

    tracing::info!(%call_connection_id, "media stream session opened");

    while let Some(message) = ws_receiver.next().await {
        match message {
            Ok(Message::Text(text)) => controller.handle_media(&text).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong: the wire protocol carries audio as base64 inside text frames
            Err(e) => {
                tracing::debug!(%call_connection_id, error = %e, "media stream read error");
                break;
            }
        }
    }

    controller.stop(&state.sessions).await;
    tracing::info!(%call_connection_id, "media stream session closed");
}
