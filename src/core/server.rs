//! Tool server and channel lifecycle.
//!
//! The server owns the configuration and the frozen tool registry. Every
//! channel a transport opens gets its own [`Dispatcher`] over the shared
//! registry, so channels never see each other's traffic.
//!
//! Tools are defined in `domains/tools/definitions/` and registered before
//! the server is built; the registry is read-only from then on.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use super::config::Config;
use super::dispatcher::Dispatcher;
use super::transport::TransportResult;
use crate::domains::tools::ToolRegistry;

/// The tool server.
#[derive(Debug, Clone)]
pub struct ToolServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools, shared by every channel.
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    /// Create a server over an already-built registry.
    pub fn new(config: Config, registry: ToolRegistry) -> Self {
        info!(
            "Serving {} tools: {}",
            registry.len(),
            registry.tool_names().join(", ")
        );
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// A fresh dispatcher for one channel.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.registry), self.config.dispatch.clone())
    }

    /// Serve one channel until the caller closes it.
    pub async fn serve_connection<R, W>(&self, reader: R, writer: W) -> TransportResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.dispatcher().serve(reader, writer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::builtin_registry;

    #[test]
    fn test_server_info() {
        let server = ToolServer::new(Config::default(), builtin_registry().unwrap());
        assert_eq!(server.name(), "toolhost");
        assert_eq!(server.version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(server.registry().tool_names(), vec!["echo", "current_time"]);
    }

    #[test]
    fn test_dispatchers_share_the_registry() {
        let server = ToolServer::new(Config::default(), builtin_registry().unwrap());
        let a = server.dispatcher();
        let b = server.dispatcher();
        assert!(std::ptr::eq(a.registry(), b.registry()));
    }
}
