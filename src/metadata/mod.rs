//! # Metadata Module
//!
//! The metadata model the declaration API accumulates into and the handler
//! compiler reads from.
//!
//! Declarations run once at startup, in unspecified order, each contributing
//! a partial fragment: one positional [`ArgumentBinding`] and, for named
//! kinds, a keyed [`ParameterConstraint`]. Fragments converge on a single
//! [`MethodMetadata`] per method through the [`MethodMetadataBuilder`]'s
//! discrete setters; no merge ever erases a field an earlier fragment set,
//! so the final descriptor is independent of declaration order.
//!
//! Methods are keyed by identity ([`MethodKey`]: controller `TypeId` plus
//! method name) in an explicit [`MetadataRegistry`] rather than attached to
//! the method itself. The registry is the single writer during startup and
//! read-only once handlers are compiled.

mod binding;
mod controller;
mod method;
mod registry;

pub use binding::{ArgumentBinding, BodyConstraint, ParameterConstraint, ValueFactory};
pub use controller::{ControllerMetadata, ControllerMetadataBuilder};
pub use method::{MethodMetadata, MethodMetadataBuilder};
pub use registry::{MetadataRegistry, MethodKey};
