//! Response envelope - the uniform shape every call outcome takes on the wire.
//!
//! ```json
//! {"request_id": 7, "status": "ok", "payload": "hi"}
//! {"request_id": 8, "status": "domain_error", "payload": "unknown tool: x"}
//! {"request_id": 9, "status": "fault", "payload": "backend unreachable", "detail": {...}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ToolError, ToolResult};
use crate::core::protocol::RequestId;

/// Outcome class of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    DomainError,
    Fault,
}

/// Response to a single tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    pub request_id: RequestId,
    pub status: Status,
    /// The result value for `ok`, the message string otherwise.
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Map<String, Value>>,
}

impl CallResponse {
    /// Build the envelope for a handler outcome.
    pub fn from_outcome(request_id: RequestId, outcome: ToolResult<Value>) -> Self {
        match outcome {
            Ok(value) => Self::ok(request_id, value),
            Err(ToolError::Domain { message, detail }) => Self {
                request_id,
                status: Status::DomainError,
                payload: Value::String(message),
                detail,
            },
            Err(ToolError::Fault { message }) => Self::fault(request_id, message),
        }
    }

    /// A successful response.
    pub fn ok(request_id: RequestId, value: Value) -> Self {
        Self {
            request_id,
            status: Status::Ok,
            payload: value,
            detail: None,
        }
    }

    /// A domain error response without detail.
    pub fn domain_error(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id,
            status: Status::DomainError,
            payload: Value::String(message.into()),
            detail: None,
        }
    }

    /// A fault response.
    pub fn fault(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id,
            status: Status::Fault,
            payload: Value::String(message.into()),
            detail: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// The error message, if this is not a success.
    pub fn message(&self) -> Option<&str> {
        match self.status {
            Status::Ok => None,
            _ => self.payload.as_str(),
        }
    }
}

/// Convert a handler's output into its transport-safe form.
///
/// This is the single conversion point between tool values and the wire.
/// How a backend-specific value (a document id, a timestamp) is rendered is
/// decided by the output type's `Serialize` impl, which the tool owns.
pub fn to_payload<T: Serialize + ?Sized>(output: &T) -> ToolResult<Value> {
    serde_json::to_value(output)
        .map_err(|e| ToolError::fault(format!("failed to serialize tool result: {}", e)))
}
