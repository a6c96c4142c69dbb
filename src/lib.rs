//! Toolhost Library
//!
//! A small tool-server core: tools are registered once with typed parameter
//! and output structs, advertised to callers as descriptors, and invoked
//! over a newline-delimited JSON channel.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, wire protocol, dispatcher, server and
//!   transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: schema extraction, the registry, handler traits, argument
//!     validation, response envelopes and the built-in tools
//!
//! # Example
//!
//! ```rust,no_run
//! use toolhost::core::{Config, ToolServer, TransportService};
//! use toolhost::domains::tools::definitions::builtin_registry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = TransportService::new(config.transport.clone());
//!     let server = ToolServer::new(config, builtin_registry()?);
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, Result, ToolClient, ToolServer};
