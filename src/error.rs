use serde_json::json;
use thiserror::Error;

use crate::response::MethodResult;

/// Request-time failure raised while assembling arguments or invoking the
/// target method.
///
/// Every variant maps to an HTTP status class via [`RequestError::status_code`].
/// Extraction and validation failures are terminal for the request; nothing in
/// this layer retries.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A query parameter declared `required` was absent from the request.
    #[error("query parameter `{name}` is required")]
    MissingRequiredParameter {
        /// Declared parameter name.
        name: String,
    },
    /// A query parameter was present but failed its shape check.
    #[error("query parameter `{name}` is invalid")]
    InvalidParameter {
        /// Declared parameter name.
        name: String,
        /// Diagnostics reported by the schema engine.
        details: Vec<String>,
    },
    /// A path parameter failed its shape check. A malformed path segment is
    /// reported as the resource not existing, with no diagnostic detail, so
    /// callers cannot distinguish "wrong route" from "right route, bad
    /// segment".
    #[error("not found")]
    NotFound,
    /// The request body was declared required and the payload was empty.
    #[error("request body is required")]
    MissingRequiredBody,
    /// The request body failed its shape check.
    #[error("request body is invalid")]
    InvalidBody {
        /// Diagnostics reported by the schema engine.
        details: Vec<String>,
    },
    /// The target method (or a value factory) returned an error. Forwarded
    /// unmodified; this layer does not classify it further.
    #[error(transparent)]
    Invocation(#[from] anyhow::Error),
}

impl RequestError {
    /// HTTP status code for this failure class.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::MissingRequiredParameter { .. } => 400,
            RequestError::InvalidParameter { .. } => 422,
            RequestError::NotFound => 404,
            RequestError::MissingRequiredBody => 400,
            RequestError::InvalidBody { .. } => 422,
            RequestError::Invocation(_) => 500,
        }
    }

    /// Render the error as a JSON response for transports that do not carry
    /// their own error renderer.
    #[must_use]
    pub fn to_response(&self) -> MethodResult {
        let body = match self {
            RequestError::InvalidParameter { details, .. }
            | RequestError::InvalidBody { details } => {
                json!({ "error": self.to_string(), "details": details })
            }
            other => json!({ "error": other.to_string() }),
        };
        MethodResult::json(self.status_code(), body)
    }
}

/// Startup-time configuration failure. Fatal before any handler is compiled;
/// never surfaced at request time.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Metadata was finalized (or looked up) for a method nothing was ever
    /// declared against. Signals a declaration-ordering or wiring mistake.
    #[error("no metadata registered for `{target}`")]
    UnknownTarget {
        /// Display form of the method key.
        target: String,
    },
    /// A declared constraint schema was rejected by the schema engine.
    #[error("schema for {location} `{name}` failed to compile: {detail}")]
    SchemaCompile {
        /// Where the schema was declared: "path parameter", "query parameter",
        /// or "request body".
        location: &'static str,
        /// Parameter name, or "body".
        name: String,
        /// Engine diagnostic.
        detail: String,
    },
}
