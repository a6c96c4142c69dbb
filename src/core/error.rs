//! Error types and handling for the tool server.
//!
//! This module defines a unified error type that can represent errors from
//! every layer, so the server and binary deal with a single type.

use thiserror::Error;

use super::transport::TransportError;
use crate::domains::tools::RegistrationError;

/// A specialized Result type for tool server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the tool server.
#[derive(Debug, Error)]
pub enum Error {
    /// A tool could not be registered.
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// The transport failed or a channel closed on bad input.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
