//! Axum server bootstrap — the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together.
//! All concrete implementations (orchestrator, TTS backend, ASR source) are
//! instantiated here and handed to the session registry's controllers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use callgate_core::{ConversationMemory, DtmfHandler, GatewayConfig, Orchestrator, SessionRegistry, TtsPlayback};

use crate::collaborators::{NullOrchestrator, NullTtsPlayback};
use crate::sse::SseBroadcaster;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Optional path to static assets for SPA serving (the observability
    /// dashboard frontend, if bundled alongside the gateway).
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Per-call engine tuning (queue capacity, timeouts, shutdown budget).
    pub gateway: GatewayConfig,
}

impl ServerConfig {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            port: 8088,
            static_dir: None,
            cors: CorsConfig::default(),
            gateway: GatewayConfig::with_defaults(),
        }
    }

    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Application context for the Axum adapter: the session registry plus the
/// collaborators every new call is wired up with.
pub struct GatewayContext {
    /// Process-wide live-session registry (§4.5).
    pub sessions: Arc<SessionRegistry>,
    /// Per-call engine tuning, shared by every session constructed here.
    pub config: GatewayConfig,
    /// AI orchestrator invoked for "final" speech events.
    pub orchestrator: Option<Arc<dyn Orchestrator>>,
    /// Streaming TTS helper for system-originated turns.
    pub tts: Arc<dyn TtsPlayback>,
    /// Optional conversation-memory collaborator.
    pub memory: Option<Arc<dyn ConversationMemory>>,
    /// Optional DTMF forwarding collaborator.
    pub dtmf: Option<Arc<dyn DtmfHandler>>,
    /// Dashboard broadcaster, also mounted at `GET /events`.
    pub dashboard: Arc<SseBroadcaster>,
}

/// Bootstrap the gateway with its default collaborators.
///
/// A deployment with a real orchestrator/TTS/ASR backend swaps
/// [`NullOrchestrator`]/[`NullTtsPlayback`] here for the concrete
/// implementations; the rest of the composition is unaffected.
pub async fn bootstrap(config: ServerConfig) -> Result<GatewayContext> {
    let sessions = Arc::new(SessionRegistry::new());
    let dashboard = Arc::new(SseBroadcaster::with_defaults());

    tracing::info!(port = config.port, "gateway bootstrap complete");

    Ok(GatewayContext {
        sessions,
        config: config.gateway,
        orchestrator: Some(Arc::new(NullOrchestrator)),
        tts: Arc::new(NullTtsPlayback),
        memory: None,
        dtmf: None,
        dashboard,
    })
}

/// Start the web server on the specified port.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(config.clone()).await?;

    let app = if let Some(ref static_dir) = config.static_dir {
        info!("serving dashboard assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("callgate gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
