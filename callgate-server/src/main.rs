//! Gateway host binary: starts the Axum server that bridges ACS telephony
//! media streams to the session engine.

use callgate_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::with_defaults();
    start_server(config).await
}
