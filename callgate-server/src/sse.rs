//! SSE-backed dashboard broadcaster.
//!
//! Implements [`callgate_core::DashboardBroadcaster`] by fanning transcript
//! events out over a `tokio::sync::broadcast` channel that `GET /events`
//! streams to connected observability dashboards. Narrowed from a general
//! app-event bus to the one event shape this gateway needs to broadcast.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::sse::{Event, Sse};
use callgate_core::DashboardBroadcaster;
use futures_util::stream::Stream;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// One broadcast transcript, serialized to the dashboard's SSE stream.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptBroadcast {
    pub call_connection_id: String,
    pub text: String,
}

/// Broadcasts transcripts to connected dashboard clients over SSE.
///
/// Events are best-effort: a lagging or absent subscriber never blocks or
/// fails a turn (§9's resolved open question).
#[derive(Debug, Clone)]
pub struct SseBroadcaster {
    sender: broadcast::Sender<TranscriptBroadcast>,
}

impl SseBroadcaster {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(256)
    }

    /// Create an SSE stream for a new dashboard client connection.
    pub fn subscribe(
        self: Arc<Self>,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let receiver = self.sender.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(|result| match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize transcript broadcast");
                    None
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "dashboard SSE stream lagged or closed");
                None
            }
        });

        Sse::new(stream).keep_alive(
            axum::response::sse::KeepAlive::new()
                .interval(std::time::Duration::from_secs(30))
                .text("ping"),
        )
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl DashboardBroadcaster for SseBroadcaster {
    async fn broadcast_transcript(&self, call_connection_id: &str, text: &str) -> anyhow::Result<()> {
        // `send` only errors when there are no subscribers, which is the
        // common case and not a failure — best-effort by contract.
        let _ = self.sender.send(TranscriptBroadcast {
            call_connection_id: call_connection_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcaster_creation_starts_with_no_subscribers() {
        let broadcaster = SseBroadcaster::with_defaults();
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_does_not_error() {
        let broadcaster = SseBroadcaster::with_defaults();
        assert!(broadcaster.broadcast_transcript("call-1", "hello").await.is_ok());
    }

    #[tokio::test]
    async fn subscriber_receives_broadcast_transcript() {
        let broadcaster = SseBroadcaster::with_defaults();
        let mut receiver = broadcaster.sender.subscribe();

        broadcaster.broadcast_transcript("call-1", "hello").await.unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.call_connection_id, "call-1");
        assert_eq!(event.text, "hello");
    }
}
