//! # Handler Compiler
//!
//! Turns one method's finalized metadata into a single executable request
//! handler. Compilation happens once, at startup: every declared constraint
//! maps through the schema engine into a compiled validator, and the
//! controller instance and method close over the result. Invocation happens
//! per request, many times, over immutable shared state.
//!
//! Per invocation the handler extracts a raw value for each positional
//! binding, runs named values through their compiled validators, assembles
//! the positional argument list, invokes the method, and applies the
//! returned [`MethodResult`](crate::response::MethodResult) to the response
//! handle. Failures are classified and routed to the
//! [`ErrorSink`](crate::transport::ErrorSink), never thrown past the handler
//! into the transport's dispatch path.

mod compile;

pub use compile::{ArgValue, CompiledHandler, HandlerCompiler};
