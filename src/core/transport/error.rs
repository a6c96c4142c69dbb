//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A frame that cannot be decoded.
///
/// Every variant except [`FramingError::ConnectionClosed`] means the byte
/// stream can no longer be trusted; the connection is closed rather than
/// guessing where the next frame starts.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The stream ended partway through a frame.
    #[error("Connection closed with {pending} bytes of an incomplete frame")]
    ConnectionClosed { pending: usize },

    /// A frame grew past the configured limit before its delimiter arrived.
    #[error("Frame exceeds {max} bytes")]
    FrameTooLarge { max: usize },

    /// The frame is not valid UTF-8.
    #[error("Frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The frame is not a recognised message.
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A well-formed message that the receiving side never accepts.
    #[error("Unexpected '{0}' message")]
    UnexpectedMessage(&'static str),

    /// The underlying stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FramingError {
    /// Whether this is the peer going away rather than bad data.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed { .. })
    }
}

/// Errors that can occur in transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// IO error during transport.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A frame could not be decoded; the channel was closed.
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// The peer answered with something other than what was asked for.
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl TransportError {
    /// Create a bind error.
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::BindError {
            address: address.into(),
            source,
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolError(msg.into())
    }
}
