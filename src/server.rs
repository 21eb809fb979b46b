use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// Bind the listener for `server.host`, which may be an IP literal or a hostname.
pub async fn bind_listener(server: &ServerConfig) -> Result<TcpListener> {
    TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", server.host, server.port))
}
