//! # Argument Declaration API
//!
//! One declaration function per binding kind. Each is pure: given the same
//! settings it always produces the same [`Declaration`] fragment, and its
//! only effect is the merge performed by
//! [`MethodMetadataBuilder::declare`](crate::metadata::MethodMetadataBuilder::declare).
//!
//! ```
//! use bindery::declare::{body, path_param, query_param, BodySettings, PathParamSettings,
//!     QueryParamSettings};
//! use bindery::metadata::MethodMetadataBuilder;
//! use serde_json::json;
//!
//! let mut builder = MethodMetadataBuilder::new();
//! builder
//!     .declare(0, path_param("id", PathParamSettings {
//!         schema: Some(json!({"type": "integer"})),
//!     }))
//!     .declare(1, query_param("limit", QueryParamSettings {
//!         required: Some(true),
//!         schema: Some(json!({"type": "integer", "minimum": 1})),
//!     }))
//!     .declare(2, body(BodySettings::default()));
//! let metadata = builder.finalize();
//! assert_eq!(metadata.args.len(), 3);
//! ```

use serde_json::Value;
use std::sync::Arc;

use crate::metadata::{ArgumentBinding, BodyConstraint, ParameterConstraint};
use crate::transport::RequestContext;

/// Settings for the request body binding.
#[derive(Debug, Clone, Default)]
pub struct BodySettings {
    /// Whether a request body is required on this method.
    pub required: Option<bool>,
    /// JSON-Schema describing the payload.
    pub schema: Option<Value>,
}

/// Settings for path parameters. Presence is guaranteed by route matching,
/// so there is no required flag; the schema still drives coercion and the
/// shape check.
#[derive(Debug, Clone, Default)]
pub struct PathParamSettings {
    /// JSON-Schema describing this parameter.
    pub schema: Option<Value>,
}

/// Settings for query parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryParamSettings {
    /// Whether this query parameter is required.
    pub required: Option<bool>,
    /// JSON-Schema describing this parameter.
    pub schema: Option<Value>,
}

/// A single declaration fragment: exactly one positional binding plus, for
/// named kinds, the keyed constraint it contributes.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub(crate) binding: ArgumentBinding,
    pub(crate) path_constraint: Option<(String, ParameterConstraint)>,
    pub(crate) query_constraint: Option<(String, ParameterConstraint)>,
    pub(crate) body_constraint: Option<BodyConstraint>,
}

impl Declaration {
    fn bare(binding: ArgumentBinding) -> Self {
        Declaration {
            binding,
            path_constraint: None,
            query_constraint: None,
            body_constraint: None,
        }
    }
}

/// Bind this slot to the whole request payload.
#[must_use]
pub fn body(settings: BodySettings) -> Declaration {
    Declaration {
        binding: ArgumentBinding::Body,
        path_constraint: None,
        query_constraint: None,
        body_constraint: Some(BodyConstraint {
            required: settings.required,
            schema: settings.schema,
        }),
    }
}

/// Bind this slot to the named path segment.
///
/// With a schema the segment is coerced to the declared type before the
/// method sees it; without one it arrives as the raw string.
#[must_use]
pub fn path_param(name: impl Into<String>, settings: PathParamSettings) -> Declaration {
    let name = name.into();
    Declaration {
        binding: ArgumentBinding::PathParam(name.clone()),
        path_constraint: Some((
            name,
            ParameterConstraint {
                schema: settings.schema,
                required: None,
            },
        )),
        query_constraint: None,
        body_constraint: None,
    }
}

/// Bind this slot to the named query value.
///
/// With a schema the value is coerced to the declared type before the method
/// sees it; without one it arrives as the raw string.
#[must_use]
pub fn query_param(name: impl Into<String>, settings: QueryParamSettings) -> Declaration {
    let name = name.into();
    Declaration {
        binding: ArgumentBinding::QueryParam(name.clone()),
        path_constraint: None,
        query_constraint: Some((
            name,
            ParameterConstraint {
                schema: settings.schema,
                required: settings.required,
            },
        )),
        body_constraint: None,
    }
}

/// Bind this slot to the raw transport request object.
#[must_use]
pub fn request() -> Declaration {
    Declaration::bare(ArgumentBinding::Request)
}

/// Bind this slot to the raw transport response handle.
#[must_use]
pub fn response() -> Declaration {
    Declaration::bare(ArgumentBinding::Response)
}

/// Bind this slot to the result of `factory(request, None)`.
///
/// The escape hatch for bindings the other kinds do not cover: derived
/// values, injected services. The factory's result is used verbatim with no
/// validation.
#[must_use]
pub fn value_factory<F>(factory: F) -> Declaration
where
    F: Fn(&RequestContext, Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Declaration::bare(ArgumentBinding::ValueFactory {
        factory: Arc::new(factory),
        options: None,
    })
}

/// Bind this slot to the result of `factory(request, Some(&options))`.
#[must_use]
pub fn value_factory_with<F>(factory: F, options: Value) -> Declaration
where
    F: Fn(&RequestContext, Option<&Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Declaration::bare(ArgumentBinding::ValueFactory {
        factory: Arc::new(factory),
        options: Some(options),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_param_contributes_binding_and_constraint() {
        let decl = query_param(
            "limit",
            QueryParamSettings {
                required: Some(true),
                schema: Some(json!({"type": "integer"})),
            },
        );
        assert!(matches!(decl.binding, ArgumentBinding::QueryParam(ref n) if n == "limit"));
        let (name, constraint) = decl.query_constraint.unwrap();
        assert_eq!(name, "limit");
        assert_eq!(constraint.required, Some(true));
    }

    #[test]
    fn test_raw_bindings_carry_no_constraints() {
        for decl in [request(), response()] {
            assert!(decl.path_constraint.is_none());
            assert!(decl.query_constraint.is_none());
            assert!(decl.body_constraint.is_none());
        }
    }
}
