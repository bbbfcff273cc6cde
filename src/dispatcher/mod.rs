//! # Dispatcher Module
//!
//! Mounts compiled handlers and routes requests to them.
//!
//! Each registered handler runs in its own `may` coroutine, fed by an MPSC
//! channel; a dispatched request travels to the coroutine with a one-shot
//! reply channel and comes back as a [`DispatchOutcome`]. Handler panics are
//! caught and surfaced as invocation errors, so one failing method never
//! takes the dispatcher down.
//!
//! The dispatcher is startup-mutable only: handlers are registered after
//! metadata accumulation and compilation finish, and the handler map is
//! read-only while requests flow.

mod core;

pub use core::{DispatchJob, DispatchOutcome, Dispatcher, HandlerSender};
