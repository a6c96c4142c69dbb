//! TCP transport implementation.
//!
//! Newline-delimited frames over TCP. Every accepted connection is its own
//! channel with its own dispatcher.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::ToolServer;

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind the listening socket.
    pub async fn bind(&self) -> TransportResult<TcpListener> {
        let addr = self.address();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))
    }

    /// Run the TCP transport. Only returns if binding fails.
    pub async fn run(self, server: ToolServer) -> TransportResult<()> {
        let listener = self.bind().await?;
        info!("Ready - listening on {}", self.address());
        Self::accept_loop(listener, server).await
    }

    /// Accept connections forever, serving each on its own task.
    pub async fn accept_loop(listener: TcpListener, server: ToolServer) -> TransportResult<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("Accepted connection from {}", peer_addr);

                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
                    }

                    let server = server.clone();
                    tokio::spawn(async move {
                        Self::handle_connection(server, stream, peer_addr).await;
                    });
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    // Small delay to avoid spinning on persistent errors
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }
    }

    /// Handle a single TCP connection.
    async fn handle_connection(server: ToolServer, stream: TcpStream, peer_addr: SocketAddr) {
        let (reader, writer) = stream.into_split();

        match server.serve_connection(reader, writer).await {
            Ok(()) => info!("Client {} disconnected cleanly", peer_addr),
            Err(e) => warn!("Closed connection to {}: {}", peer_addr, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, ToolClient};
    use crate::domains::tools::definitions::builtin_registry;
    use serde_json::{Map, json};

    #[tokio::test]
    async fn test_connections_are_independent() {
        let transport = TcpTransport::new(TcpConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        });
        let listener = transport.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = ToolServer::new(Config::default(), builtin_registry().unwrap());
        tokio::spawn(TcpTransport::accept_loop(listener, server));

        let (r1, w1) = TcpStream::connect(addr).await.unwrap().into_split();
        let (r2, w2) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut first = ToolClient::new(r1, w1);
        let mut second = ToolClient::new(r2, w2);

        let mut args = Map::new();
        args.insert("text".into(), json!("one"));
        let resp = first.call_tool("echo", args).await.unwrap();
        assert_eq!(resp.payload, json!("one"));

        // The second connection starts its own id sequence.
        let tools = second.list_tools().await.unwrap();
        assert_eq!(tools.len(), 2);

        first.close().await.unwrap();
        let mut args = Map::new();
        args.insert("text".into(), json!("two"));
        let resp = second.call_tool("echo", args).await.unwrap();
        assert_eq!(resp.payload, json!("two"));
    }
}
