use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::transport::RequestContext;

/// Custom extraction function: given the transport request and the options
/// bound at declaration time, produce the argument value. The result is
/// trusted and bypasses validation entirely.
pub type ValueFactory =
    Arc<dyn Fn(&RequestContext, Option<&Value>) -> anyhow::Result<Value> + Send + Sync>;

/// Where one positional method argument comes from.
///
/// Exactly one binding exists per declared slot. `Unbound` marks a gap left
/// by sparse declaration; it resolves to an absent argument at request time.
#[derive(Clone)]
pub enum ArgumentBinding {
    /// The whole request payload, as parsed by the transport.
    Body,
    /// The named path segment.
    PathParam(String),
    /// The named query value.
    QueryParam(String),
    /// The raw transport request object, opaque to validation.
    Request,
    /// The raw transport response handle, opaque to validation.
    Response,
    /// The result of calling `factory(request, options)`.
    ValueFactory {
        /// Extraction function bound at declaration time.
        factory: ValueFactory,
        /// Options value passed verbatim to the factory on every request.
        options: Option<Value>,
    },
    /// A declared position with no binding; the method receives an absent
    /// value there.
    Unbound,
}

impl fmt::Debug for ArgumentBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentBinding::Body => f.write_str("Body"),
            ArgumentBinding::PathParam(name) => f.debug_tuple("PathParam").field(name).finish(),
            ArgumentBinding::QueryParam(name) => f.debug_tuple("QueryParam").field(name).finish(),
            ArgumentBinding::Request => f.write_str("Request"),
            ArgumentBinding::Response => f.write_str("Response"),
            ArgumentBinding::ValueFactory { options, .. } => f
                .debug_struct("ValueFactory")
                .field("options", options)
                .finish_non_exhaustive(),
            ArgumentBinding::Unbound => f.write_str("Unbound"),
        }
    }
}

/// Shape constraint for a named path or query parameter.
///
/// Both fields are optional so that independent declarations can each
/// contribute one of them; [`ParameterConstraint::merge`] never erases a
/// field the incoming fragment does not set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterConstraint {
    /// JSON-Schema shape descriptor (type, format, enum, bounds, ...).
    pub schema: Option<Value>,
    /// Whether the parameter must be present. Meaningful for query
    /// parameters only; a matched route guarantees path presence.
    pub required: Option<bool>,
}

impl ParameterConstraint {
    /// Merge another fragment into this one. Set fields from `other` win;
    /// unset fields leave the existing value untouched.
    pub fn merge(&mut self, other: ParameterConstraint) {
        if other.schema.is_some() {
            self.schema = other.schema;
        }
        if other.required.is_some() {
            self.required = other.required;
        }
    }
}

/// Constraint applied to the whole request payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BodyConstraint {
    /// Whether a payload must be present.
    pub required: Option<bool>,
    /// JSON-Schema shape descriptor for the payload.
    pub schema: Option<Value>,
}

impl BodyConstraint {
    /// Merge another fragment into this one, field-wise like
    /// [`ParameterConstraint::merge`].
    pub fn merge(&mut self, other: BodyConstraint) {
        if other.required.is_some() {
            self.required = other.required;
        }
        if other.schema.is_some() {
            self.schema = other.schema;
        }
    }
}
