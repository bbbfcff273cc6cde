use jsonschema::{validator_for, Validator};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Compilation failure reported by a schema engine.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

/// The shape-validation engine, as a narrow explicit dependency.
///
/// Any conforming implementation satisfies the contract: compile once,
/// check many times, report diagnostics as strings. The default is
/// [`JsonSchemaEngine`]; a hand-rolled validator works just as well.
pub trait SchemaEngine: Send + Sync {
    /// Compile a JSON-Schema-like shape descriptor into a reusable checker.
    ///
    /// # Errors
    ///
    /// [`SchemaError`] when the descriptor itself is malformed.
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, SchemaError>;
}

/// A compiled shape checker, immutable and safely shared across requests.
pub trait CompiledSchema: Send + Sync {
    /// Check a value, returning the engine's diagnostics on failure.
    fn check(&self, value: &Value) -> Result<(), Vec<String>>;
}

/// Default engine backed by the `jsonschema` crate
/// (JSON-Schema-06-compatible subset: type, format, enum, numeric and string
/// constraints).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl SchemaEngine for JsonSchemaEngine {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, SchemaError> {
        let compiled =
            validator_for(schema).map_err(|e| SchemaError(e.to_string()))?;
        Ok(Arc::new(CompiledJsonSchema { compiled }))
    }
}

struct CompiledJsonSchema {
    compiled: Validator,
}

impl CompiledSchema for CompiledJsonSchema {
    fn check(&self, value: &Value) -> Result<(), Vec<String>> {
        let errors: Vec<String> =
            self.compiled.iter_errors(value).map(|e| e.to_string()).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Coerce a raw transport string to a typed JSON value per the schema's
/// `type`.
///
/// Path and query values always arrive as strings; the declared type decides
/// what the method should see. A value that does not parse stays a string so
/// the shape check reports the mismatch instead of this function guessing.
#[must_use]
pub fn coerce_value(raw: &str, schema: Option<&Value>) -> Value {
    fn convert_primitive(val: &str, schema: Option<&Value>) -> Value {
        if let Some(ty) = schema.and_then(|s| s.get("type").and_then(|v| v.as_str())) {
            match ty {
                "integer" => val
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(val.to_string())),
                "number" => val
                    .parse::<f64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(val.to_string())),
                "boolean" => val
                    .parse::<bool>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(val.to_string())),
                _ => Value::String(val.to_string()),
            }
        } else {
            Value::String(val.to_string())
        }
    }

    if let Some(ty) = schema.and_then(|s| s.get("type").and_then(|v| v.as_str())) {
        match ty {
            "array" => {
                let items_schema = schema.and_then(|s| s.get("items"));
                let parts = raw
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|p| convert_primitive(p.trim(), items_schema))
                    .collect::<Vec<_>>();
                Value::Array(parts)
            }
            "object" => serde_json::from_str(raw).unwrap_or(Value::String(raw.to_string())),
            _ => convert_primitive(raw, schema),
        }
    } else {
        Value::String(raw.to_string())
    }
}

/// The schema's declared `default`, substituted for absent optional values.
#[must_use]
pub fn schema_default(schema: Option<&Value>) -> Option<Value> {
    schema.and_then(|s| s.get("default")).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer() {
        let schema = json!({"type": "integer"});
        assert_eq!(coerce_value("42", Some(&schema)), json!(42));
        assert_eq!(coerce_value("nope", Some(&schema)), json!("nope"));
    }

    #[test]
    fn test_coerce_boolean_and_number() {
        assert_eq!(coerce_value("true", Some(&json!({"type": "boolean"}))), json!(true));
        assert_eq!(coerce_value("2.5", Some(&json!({"type": "number"}))), json!(2.5));
    }

    #[test]
    fn test_coerce_array_of_integers() {
        let schema = json!({"type": "array", "items": {"type": "integer"}});
        assert_eq!(coerce_value("1,2,3", Some(&schema)), json!([1, 2, 3]));
    }

    #[test]
    fn test_no_schema_stays_string() {
        assert_eq!(coerce_value("42", None), json!("42"));
    }

    #[test]
    fn test_engine_reports_diagnostics() {
        let engine = JsonSchemaEngine;
        let compiled = engine
            .compile(&json!({"type": "integer", "minimum": 1}))
            .expect("schema compiles");
        assert!(compiled.check(&json!(3)).is_ok());
        let details = compiled.check(&json!(0)).unwrap_err();
        assert!(!details.is_empty());
    }
}
