//! Current time tool definition.
//!
//! A blocking tool: it reads the system clock and formats the result with a
//! caller-supplied strftime pattern.

use std::fmt::Write as _;

use chrono::{Local, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::domains::tools::{BlockingTool, ToolError, ToolResult};

/// ISO 8601 with a numeric offset, e.g. `2024-05-01T09:30:00+02:00`.
pub const DEFAULT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the current time tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CurrentTimeParams {
    /// strftime-style format string.
    #[serde(default = "default_format")]
    pub format: String,

    /// Report UTC instead of the server's local time.
    #[serde(default)]
    pub utc: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Current time tool - formats the server clock.
pub struct CurrentTimeTool;

impl CurrentTimeTool {
    /// Render `now` with `format`, reporting bad patterns as domain errors.
    fn render<Tz>(now: chrono::DateTime<Tz>, format: &str) -> ToolResult<String>
    where
        Tz: chrono::TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let mut out = String::new();
        write!(out, "{}", now.format(format))
            .map_err(|_| ToolError::domain(format!("invalid time format: {}", format)))?;
        Ok(out)
    }
}

impl BlockingTool for CurrentTimeTool {
    const NAME: &'static str = "current_time";
    const DESCRIPTION: &'static str =
        "Return the current server time, formatted with a strftime pattern.";

    type Params = CurrentTimeParams;
    type Output = String;

    #[instrument(skip_all, fields(format = %params.format, utc = params.utc))]
    fn call(&self, params: CurrentTimeParams) -> ToolResult<String> {
        info!("Current time tool called");

        if params.format.trim().is_empty() {
            return Err(ToolError::domain("format cannot be empty"));
        }

        if params.utc {
            Self::render(Utc::now(), &params.format)
        } else {
            Self::render(Local::now(), &params.format)
        }
    }
}
