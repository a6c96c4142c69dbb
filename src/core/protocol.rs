//! Wire message types.
//!
//! Every frame carries one [`Message`], a JSON object tagged by `"type"`:
//!
//! | type          | direction        | answered by   |
//! |---------------|------------------|---------------|
//! | `list_tools`  | caller → server  | `tool_list`   |
//! | `call_tool`   | caller → server  | `call_result` |
//! | `tool_list`   | server → caller  |               |
//! | `call_result` | server → caller  |               |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domains::tools::{Arguments, ToolDescriptor};

pub use crate::domains::tools::{CallResponse, Status};

/// Opaque correlation token chosen by the caller and echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Value);

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(Value::from(id))
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(Value::from(id))
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(Value::String(id))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// A request to invoke one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub request_id: RequestId,
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

/// One frame's worth of protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Ask for every registered tool's descriptor.
    ListTools { request_id: RequestId },

    /// Answer to `ListTools`, in registration order.
    ToolList {
        request_id: RequestId,
        tools: Vec<ToolDescriptor>,
    },

    /// Invoke a tool.
    CallTool(CallRequest),

    /// Answer to `CallTool`.
    CallResult(CallResponse),
}

impl Message {
    /// The wire name of this message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListTools { .. } => "list_tools",
            Self::ToolList { .. } => "tool_list",
            Self::CallTool(_) => "call_tool",
            Self::CallResult(_) => "call_result",
        }
    }

    pub fn request_id(&self) -> &RequestId {
        match self {
            Self::ListTools { request_id } | Self::ToolList { request_id, .. } => request_id,
            Self::CallTool(req) => &req.request_id,
            Self::CallResult(resp) => &resp.request_id,
        }
    }
}
