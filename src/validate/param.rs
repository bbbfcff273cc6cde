use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::engine::{coerce_value, schema_default, CompiledSchema, SchemaEngine};
use crate::error::{MetadataError, RequestError};
use crate::metadata::{BodyConstraint, ParameterConstraint};

/// Which request surface a named parameter is read from. Decides how a shape
/// failure is classified: a malformed query value is a client input error,
/// a malformed path segment means the resource does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// Path segment; presence guaranteed by route matching.
    Path,
    /// Query string value; may be absent.
    Query,
}

/// A named parameter's validate/coerce function, compiled once per parameter
/// at handler-compile time and reused, side-effect free, across all requests.
#[derive(Clone)]
pub struct ParamValidator {
    name: String,
    source: ParamSource,
    required: bool,
    schema: Option<Value>,
    compiled: Option<Arc<dyn CompiledSchema>>,
}

impl std::fmt::Debug for ParamValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamValidator")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("required", &self.required)
            .field("has_schema", &self.schema.is_some())
            .finish()
    }
}

impl ParamValidator {
    /// Compile the validator for one declared constraint.
    ///
    /// # Errors
    ///
    /// [`MetadataError::SchemaCompile`] when the declared schema is rejected
    /// by the engine — a startup failure, never a request-time one.
    pub fn compile(
        engine: &dyn SchemaEngine,
        name: impl Into<String>,
        source: ParamSource,
        constraint: &ParameterConstraint,
    ) -> Result<Self, MetadataError> {
        let name = name.into();
        let compiled = match &constraint.schema {
            Some(schema) => Some(engine.compile(schema).map_err(|e| {
                MetadataError::SchemaCompile {
                    location: match source {
                        ParamSource::Path => "path parameter",
                        ParamSource::Query => "query parameter",
                    },
                    name: name.clone(),
                    detail: e.to_string(),
                }
            })?),
            None => None,
        };
        debug!(name = %name, source = ?source, "parameter validator compiled");
        Ok(ParamValidator {
            name,
            source,
            required: constraint.required.unwrap_or(false),
            schema: constraint.schema.clone(),
            compiled,
        })
    }

    /// Validate and coerce one raw transport value.
    ///
    /// Returns `Ok(None)` when an optional value is absent and the schema
    /// declares no default; the argument resolves to absent. Presence is
    /// checked before the shape runs, so "missing" and "malformed" never
    /// blur together.
    ///
    /// # Errors
    ///
    /// Query values: [`RequestError::MissingRequiredParameter`] when a
    /// required value is absent, [`RequestError::InvalidParameter`] with the
    /// engine diagnostics on a shape failure. Path values:
    /// [`RequestError::NotFound`] on any failure, with no detail.
    pub fn validate(&self, raw: Option<&str>) -> Result<Option<Value>, RequestError> {
        let raw = match raw {
            Some(raw) => raw,
            None => {
                return match self.source {
                    ParamSource::Query => {
                        if self.required {
                            Err(RequestError::MissingRequiredParameter {
                                name: self.name.clone(),
                            })
                        } else {
                            Ok(schema_default(self.schema.as_ref()))
                        }
                    }
                    // A matched route supplies every declared segment; an
                    // absent one is indistinguishable from a bad route.
                    ParamSource::Path => Err(RequestError::NotFound),
                };
            }
        };

        let value = coerce_value(raw, self.schema.as_ref());
        if let Some(compiled) = &self.compiled {
            if let Err(details) = compiled.check(&value) {
                return Err(match self.source {
                    ParamSource::Query => RequestError::InvalidParameter {
                        name: self.name.clone(),
                        details,
                    },
                    ParamSource::Path => RequestError::NotFound,
                });
            }
        }
        Ok(Some(value))
    }

    /// The declared parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The request payload's validate function, compiled once per method.
#[derive(Clone)]
pub struct BodyValidator {
    required: bool,
    compiled: Option<Arc<dyn CompiledSchema>>,
}

impl std::fmt::Debug for BodyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyValidator")
            .field("required", &self.required)
            .field("has_schema", &self.compiled.is_some())
            .finish()
    }
}

impl BodyValidator {
    /// Compile the validator for the method's body constraint.
    ///
    /// # Errors
    ///
    /// [`MetadataError::SchemaCompile`] when the declared schema is rejected
    /// by the engine.
    pub fn compile(
        engine: &dyn SchemaEngine,
        constraint: &BodyConstraint,
    ) -> Result<Self, MetadataError> {
        let compiled = match &constraint.schema {
            Some(schema) => {
                Some(
                    engine
                        .compile(schema)
                        .map_err(|e| MetadataError::SchemaCompile {
                            location: "request body",
                            name: "body".to_string(),
                            detail: e.to_string(),
                        })?,
                )
            }
            None => None,
        };
        Ok(BodyValidator {
            required: constraint.required.unwrap_or(false),
            compiled,
        })
    }

    /// Validate the parsed payload, if any.
    ///
    /// # Errors
    ///
    /// [`RequestError::MissingRequiredBody`] when a required payload is
    /// absent; [`RequestError::InvalidBody`] with engine diagnostics on a
    /// shape failure.
    pub fn validate(&self, body: Option<&Value>) -> Result<Option<Value>, RequestError> {
        match body {
            None => {
                if self.required {
                    Err(RequestError::MissingRequiredBody)
                } else {
                    Ok(None)
                }
            }
            Some(value) => {
                if let Some(compiled) = &self.compiled {
                    compiled
                        .check(value)
                        .map_err(|details| RequestError::InvalidBody { details })?;
                }
                Ok(Some(value.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::JsonSchemaEngine;
    use serde_json::json;

    fn query_validator(constraint: ParameterConstraint) -> ParamValidator {
        ParamValidator::compile(&JsonSchemaEngine, "limit", ParamSource::Query, &constraint)
            .expect("validator compiles")
    }

    #[test]
    fn test_required_query_absent_is_missing_not_invalid() {
        let v = query_validator(ParameterConstraint {
            schema: Some(json!({"type": "integer", "minimum": 1})),
            required: Some(true),
        });
        let err = v.validate(None).unwrap_err();
        assert!(
            matches!(err, RequestError::MissingRequiredParameter { ref name } if name == "limit")
        );
    }

    #[test]
    fn test_optional_query_absent_uses_schema_default() {
        let v = query_validator(ParameterConstraint {
            schema: Some(json!({"type": "integer", "default": 20})),
            required: None,
        });
        assert_eq!(v.validate(None).unwrap(), Some(json!(20)));
    }

    #[test]
    fn test_query_shape_failure_names_parameter() {
        let v = query_validator(ParameterConstraint {
            schema: Some(json!({"type": "integer", "minimum": 1})),
            required: None,
        });
        let err = v.validate(Some("0")).unwrap_err();
        match err {
            RequestError::InvalidParameter { name, details } => {
                assert_eq!(name, "limit");
                assert!(!details.is_empty());
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_path_shape_failure_is_not_found() {
        let v = ParamValidator::compile(
            &JsonSchemaEngine,
            "id",
            ParamSource::Path,
            &ParameterConstraint {
                schema: Some(json!({"type": "integer"})),
                required: None,
            },
        )
        .expect("validator compiles");
        assert!(matches!(v.validate(Some("abc")).unwrap_err(), RequestError::NotFound));
        assert_eq!(v.validate(Some("42")).unwrap(), Some(json!(42)));
    }

    #[test]
    fn test_body_required_and_shape() {
        let v = BodyValidator::compile(
            &JsonSchemaEngine,
            &BodyConstraint {
                required: Some(true),
                schema: Some(json!({
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                })),
            },
        )
        .expect("validator compiles");
        assert!(matches!(v.validate(None).unwrap_err(), RequestError::MissingRequiredBody));
        assert!(matches!(
            v.validate(Some(&json!({}))).unwrap_err(),
            RequestError::InvalidBody { .. }
        ));
        assert!(v.validate(Some(&json!({"name": "Fluffy"}))).is_ok());
    }
}
