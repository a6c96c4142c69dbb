//! Tool definitions module.
//!
//! Built-in tools shipped with the server binary. Each tool is defined in
//! its own file; backend-specific tools (databases, calendars) plug in the
//! same way from the embedding application.

pub mod clock;
pub mod echo;

pub use clock::{CurrentTimeParams, CurrentTimeTool};
pub use echo::{EchoParams, EchoTool};

use super::{RegistrationError, ToolRegistry, ToolRegistryBuilder};

/// Register every built-in tool on `builder`.
pub fn register_builtin(builder: &mut ToolRegistryBuilder) -> Result<(), RegistrationError> {
    builder.tool(EchoTool)?.blocking_tool(CurrentTimeTool)?;
    Ok(())
}

/// A registry holding only the built-in tools.
pub fn builtin_registry() -> Result<ToolRegistry, RegistrationError> {
    let mut builder = ToolRegistry::builder();
    register_builtin(&mut builder)?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.tool_names(), vec!["echo", "current_time"]);
    }

    #[test]
    fn test_builtin_registration_is_not_repeatable() {
        let mut builder = ToolRegistry::builder();
        register_builtin(&mut builder).unwrap();
        assert!(register_builtin(&mut builder).is_err());
    }
}
