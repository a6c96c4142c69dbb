//! Echo tool definition.
//!
//! Returns its input unchanged. Useful for checking that a caller can reach
//! the server and that framing survives arbitrary text.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domains::tools::{Tool, ToolResult};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the echo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EchoParams {
    /// Text to send back.
    pub text: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Echo tool - returns `text` unchanged.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    const NAME: &'static str = "echo";
    const DESCRIPTION: &'static str = "Return the given text unchanged.";

    type Params = EchoParams;
    type Output = String;

    #[instrument(skip_all, fields(len = params.text.len()))]
    async fn call(&self, params: EchoParams) -> ToolResult<String> {
        debug!("Echo tool called");
        Ok(params.text)
    }
}
