//! Tool Registry - central registration and lookup for all tools.
//!
//! The registry is assembled once at startup through [`ToolRegistryBuilder`]
//! and is read-only afterwards, so lookups need no locking. Listing order is
//! registration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::error::RegistrationError;
use super::handlers::{AsyncHandler, BlockingHandler, BlockingTool, Tool, ToolHandler};
use super::schema::ToolDescriptor;

/// A registered tool: its descriptor and the handler that executes it.
#[derive(Clone)]
pub struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

impl fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects tools before serving begins.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `descriptor.name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateTool`] if the name is taken and
    /// [`RegistrationError::EmptyName`] if it is blank.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<&mut Self, RegistrationError> {
        if descriptor.name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.index.contains_key(&descriptor.name) {
            return Err(RegistrationError::DuplicateTool {
                name: descriptor.name,
            });
        }

        debug!(
            "Registering tool '{}' ({} parameters)",
            descriptor.name,
            descriptor.parameters.len()
        );
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler,
        });
        Ok(self)
    }

    /// Register a [`Tool`], extracting its descriptor from its types.
    pub fn tool<T: Tool>(&mut self, tool: T) -> Result<&mut Self, RegistrationError> {
        let descriptor = ToolDescriptor::extract::<T::Params, T::Output>(T::NAME, T::DESCRIPTION)?;
        self.register(descriptor, Arc::new(AsyncHandler(Arc::new(tool))))
    }

    /// Register a [`BlockingTool`], extracting its descriptor from its types.
    pub fn blocking_tool<T: BlockingTool>(
        &mut self,
        tool: T,
    ) -> Result<&mut Self, RegistrationError> {
        let descriptor = ToolDescriptor::extract::<T::Params, T::Output>(T::NAME, T::DESCRIPTION)?;
        self.register(descriptor, Arc::new(BlockingHandler(Arc::new(tool))))
    }

    /// Freeze the registry.
    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            tools: self.tools,
            index: self.index,
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable name → tool mapping.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Look up a tool by name. Absence is a normal outcome.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// All descriptors in registration order.
    ///
    /// The iterator is lazy and can be cloned to walk the list again.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> + Clone + '_ {
        self.tools.iter().map(RegisteredTool::descriptor)
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.list().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
