//! Transport layer for the tool server.
//!
//! - **framing**: newline-delimited JSON frames, shared by every transport
//! - **STDIO**: one channel over stdin/stdout (default) - feature: `stdio`
//! - **TCP**: one channel per accepted connection - feature: `tcp`
//!
//! Each transport only moves bytes; message handling is delegated to the
//! server's dispatcher.

mod config;
mod error;
pub mod framing;
mod service;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{FramingError, TransportError, TransportResult};
pub use framing::{FrameReader, FrameWriter};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;
