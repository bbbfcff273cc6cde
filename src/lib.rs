//! # Bindery
//!
//! **Bindery** is a metadata-driven request-binding and validation layer: it
//! sits between an HTTP framework's raw request object and a plain method
//! call on a controller object.
//!
//! ## Overview
//!
//! A method declares, per positional parameter, where each argument comes
//! from — the request body, a named path segment, a named query parameter,
//! the raw request/response objects, or a custom extraction function — and
//! what shape it must have. At request time the compiled handler
//! deterministically extracts, validates, coerces, and orders those
//! arguments, invokes the method, and translates its return value into an
//! HTTP response.
//!
//! ## Architecture
//!
//! - **[`metadata`]** — per-method accumulator, identity-keyed registry, and
//!   controller-level metadata
//! - **[`declare`]** — one declaration function per argument kind, each
//!   contributing a partial fragment in any order
//! - **[`validate`]** — schema engine interface and the validator compiler
//!   (compile once, validate per request)
//! - **[`handler`]** — handler compiler and the compiled request handler
//! - **[`response`]** — the explicit status/headers/body result wrapper
//! - **[`transport`]** — request context, response handle, and error sink
//!   traits the host framework plugs into
//! - **[`dispatcher`]** — coroutine-based mounting of compiled handlers
//! - **[`middleware`]** — before/after hooks around dispatch
//!
//! Declarations run once at startup and may arrive in any order; the
//! accumulated metadata is finalized, compiled once per method (all schema
//! validators included), and shared read-only across every request after
//! that. Validation failures are classified — missing required input,
//! invalid input shape, unresolvable route — and routed to the transport's
//! error channel rather than thrown through its dispatch path.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use bindery::declare::{path_param, PathParamSettings};
//! use bindery::handler::{ArgValue, HandlerCompiler};
//! use bindery::metadata::{MetadataRegistry, MethodKey};
//! use bindery::response::MethodResult;
//! use bindery::transport::{RequestContext, ResponseHandle};
//! use http::Method;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! struct PetController;
//!
//! // Startup: declarations accumulate, then finalize and compile once.
//! let mut registry = MetadataRegistry::new();
//! let key = MethodKey::of::<PetController>("get_pet");
//! registry.method(key).declare(
//!     0,
//!     path_param("id", PathParamSettings {
//!         schema: Some(json!({"type": "integer"})),
//!     }),
//! );
//! let metadata = registry.finalize_method(&key)?;
//!
//! let handler = HandlerCompiler::new().compile(
//!     Arc::new(PetController),
//!     |_controller: &PetController, args: &[ArgValue]| {
//!         let id = args[0].as_json().cloned().unwrap_or_default();
//!         Ok(MethodResult::ok(json!({ "id": id })))
//!     },
//!     metadata,
//! )?;
//!
//! // Per request: the segment string "42" is coerced to integer 42.
//! let req = Arc::new(RequestContext::new(Method::GET, "/pets/42").with_path_param("id", "42"));
//! let res = ResponseHandle::new();
//! let result = handler.invoke(&req, &res)?;
//! assert_eq!(result.status, 200);
//! assert_eq!(result.body, json!({ "id": 42 }));
//! # Ok(())
//! # }
//! ```

pub mod declare;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod metadata;
pub mod middleware;
pub mod response;
pub mod transport;
pub mod validate;

pub use error::{MetadataError, RequestError};
pub use handler::{ArgValue, CompiledHandler, HandlerCompiler};
pub use metadata::{
    ArgumentBinding, BodyConstraint, ControllerMetadata, MetadataRegistry, MethodKey,
    MethodMetadata, MethodMetadataBuilder, ParameterConstraint,
};
pub use response::{HeaderVec, MethodResult};
pub use transport::{ErrorSink, RequestContext, RequestId, ResponseHandle};
pub use validate::{JsonSchemaEngine, SchemaEngine};
