//! Render context: the metadata snapshot bound as the template root.

use serde_json::Value;

use crate::error::RenderError;

/// Convert a metadata snapshot into a [`tera::Context`].
///
/// The snapshot must be a JSON object; its top-level keys become template
/// variables (`{{ services }}`, `{{ self.stack.name }}`, ...).
pub fn to_tera_context(data: &Value) -> Result<tera::Context, RenderError> {
    match data {
        Value::Object(_) => tera::Context::from_value(data.clone()).map_err(RenderError::from),
        other => Err(RenderError::ContextNotObject {
            kind: kind_of(other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
