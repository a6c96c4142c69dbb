//! Tools domain module.
//!
//! This module handles everything between "a call arrived for tool X" and
//! "here is the envelope to send back".
//!
//! ## Architecture
//!
//! - `schema.rs` - Schema extraction from parameter and output types
//! - `registry.rs` - Central tool registry, built once at startup
//! - `handlers.rs` - `Tool` / `BlockingTool` traits and their erased form
//! - `validation.rs` - Argument checks and default filling
//! - `envelope.rs` - Uniform ok / domain_error / fault responses
//! - `error.rs` - Tool-specific error types
//! - `definitions/` - Built-in tool implementations (one file per tool)
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define a params struct deriving `Deserialize` + `JsonSchema`
//! 3. Implement `Tool` (suspends) or `BlockingTool` (blocks)
//! 4. Register it in `definitions::register_builtin`

pub mod definitions;
pub mod envelope;
mod error;
pub mod handlers;
pub mod registry;
pub mod schema;
pub mod validation;

pub use envelope::{CallResponse, Status};
pub use error::{RegistrationError, ToolError, ToolResult, ValidationError};
pub use handlers::{Arguments, BlockingTool, NoParams, Tool, ToolHandler};
pub use registry::{RegisteredTool, ToolRegistry, ToolRegistryBuilder};
pub use schema::{ParameterSpec, ResultKind, ToolDescriptor, ValueKind};
