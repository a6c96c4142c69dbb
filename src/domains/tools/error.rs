//! Tool-specific error types.
//!
//! Three families live here:
//! - [`RegistrationError`]: raised while the registry is being built. Fatal;
//!   the server never starts with an invalid registry.
//! - [`ValidationError`]: an incoming call did not match the tool's schema.
//!   Reported to the caller as a domain error; the handler never runs.
//! - [`ToolError`]: the outcome of a handler that did run and did not succeed.

use serde_json::{Map, Value};
use thiserror::Error;

/// Result type returned by tool handlers.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Errors raised while registering tools.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// A tool with the same name is already registered.
    #[error("Duplicate tool: '{name}' is already registered")]
    DuplicateTool { name: String },

    /// Tool names must be non-empty.
    #[error("Tool name cannot be empty")]
    EmptyName,

    /// A parameter's declared type cannot be mapped to a value kind.
    #[error("Tool '{tool}': unsupported type for parameter '{parameter}': {reason}")]
    UnsupportedParameter {
        tool: String,
        parameter: String,
        reason: String,
    },

    /// The declared return type cannot be mapped to a result kind.
    #[error("Tool '{tool}': unsupported return type: {reason}")]
    UnsupportedReturn { tool: String, reason: String },

    /// The generated schema does not describe a parameter struct.
    #[error("Tool '{tool}': invalid parameter schema: {reason}")]
    InvalidSchema { tool: String, reason: String },
}

/// An incoming call that does not match the tool's declared parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("invalid type for parameter '{parameter}': expected {expected}")]
    InvalidType { parameter: String, expected: String },

    /// The arguments passed schema checks but could not be decoded into the
    /// tool's parameter struct (e.g. an integer out of range).
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// A failed handler invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// An expected, documented failure mode of the tool.
    #[error("{message}")]
    Domain {
        message: String,
        detail: Option<Map<String, Value>>,
    },

    /// An unanticipated failure. Callers should not retry by default.
    #[error("{message}")]
    Fault { message: String },
}

impl ToolError {
    /// Create a domain error with just a message.
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
            detail: None,
        }
    }

    /// Create a domain error carrying a structured detail mapping.
    pub fn domain_with_detail(message: impl Into<String>, detail: Map<String, Value>) -> Self {
        Self::Domain {
            message: message.into(),
            detail: Some(detail),
        }
    }

    /// Create a fault.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }

    /// Whether this is a fault rather than a domain error.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        Self::domain(err.to_string())
    }
}

/// Backend failures bubbled up with `?` inside a handler body are faults.
impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::fault(format!("{:#}", err))
    }
}
