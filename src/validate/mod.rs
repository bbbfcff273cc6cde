//! # Validator Compiler
//!
//! Turns declared constraints into reusable validate/coerce functions,
//! compiled once per named parameter at handler-compile time and shared
//! read-only across every request after that.
//!
//! Transport values are strings, so validation runs in two steps the way the
//! routing layer this grew out of does it: coerce the raw string to the
//! schema's declared type, then run the compiled shape check. Presence is
//! checked before shape — engines do not cleanly distinguish "absent" from
//! "wrong type", and the error classification depends on the difference.

mod engine;
mod param;

pub use engine::{coerce_value, schema_default, CompiledSchema, JsonSchemaEngine, SchemaEngine, SchemaError};
pub use param::{BodyValidator, ParamSource, ParamValidator};
