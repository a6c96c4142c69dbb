//! STDIO transport implementation.
//!
//! One channel over the process's stdin/stdout. Logs go to stderr so stdout
//! carries frames only.

use tracing::info;

use super::TransportResult;
use crate::core::ToolServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until stdin reaches end of input.
    pub async fn run(server: ToolServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        server
            .serve_connection(tokio::io::stdin(), tokio::io::stdout())
            .await?;

        info!("STDIO transport finished");
        Ok(())
    }
}
