//! Argument validation against a tool's declared parameters.

use serde_json::Value;

use super::error::ValidationError;
use super::handlers::Arguments;
use super::schema::ToolDescriptor;

/// Check `arguments` against `descriptor` and fill in defaults.
///
/// Returns the arguments the handler will see: every declared parameter
/// present, in declaration order. Nothing is invoked on failure.
pub fn validate_arguments(
    descriptor: &ToolDescriptor,
    mut arguments: Arguments,
) -> Result<Arguments, ValidationError> {
    if let Some(unknown) = arguments
        .keys()
        .find(|name| descriptor.parameter(name).is_none())
    {
        return Err(ValidationError::UnknownParameter(unknown.clone()));
    }

    let mut validated = Arguments::new();
    for spec in &descriptor.parameters {
        let value = match arguments.remove(&spec.name) {
            Some(value) => {
                if !spec.kind.accepts(&value) {
                    return Err(ValidationError::InvalidType {
                        parameter: spec.name.clone(),
                        expected: spec.kind.to_string(),
                    });
                }
                value
            }
            None if spec.required => {
                return Err(ValidationError::MissingParameter(spec.name.clone()));
            }
            None => spec.default.clone().unwrap_or(Value::Null),
        };
        validated.insert(spec.name.clone(), value);
    }

    Ok(validated)
}
