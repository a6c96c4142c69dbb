//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, the wire protocol, request dispatch, the
//! server facade, a caller-side client and the transport layer.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod server;
pub mod transport;

pub use client::ToolClient;
pub use config::{Config, DispatchConfig};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use protocol::{CallRequest, CallResponse, Message, RequestId, Status};
pub use server::ToolServer;
pub use transport::{TransportConfig, TransportService};
