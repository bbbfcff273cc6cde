use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::binding::{ArgumentBinding, BodyConstraint, ParameterConstraint};
use crate::declare::Declaration;

/// Per-method metadata accumulator.
///
/// Independent declarations execute in unspecified order during startup and
/// converge on one consistent descriptor through discrete, idempotent
/// setters: positional bindings keyed by index, named constraints keyed by
/// name, one body constraint. No validation happens here; accumulation is
/// purely structural.
#[derive(Debug, Clone, Default)]
pub struct MethodMetadataBuilder {
    args: BTreeMap<usize, ArgumentBinding>,
    path_params: HashMap<String, ParameterConstraint>,
    query_params: HashMap<String, ParameterConstraint>,
    body: Option<BodyConstraint>,
}

impl MethodMetadataBuilder {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a declaration fragment to the given positional slot: the
    /// fragment's binding lands at `index`, and any named or body constraint
    /// it carries merges into the corresponding map.
    pub fn declare(&mut self, index: usize, declaration: Declaration) -> &mut Self {
        let Declaration {
            binding,
            path_constraint,
            query_constraint,
            body_constraint,
        } = declaration;
        if let Some((name, constraint)) = path_constraint {
            self.set_path_param(name, constraint);
        }
        if let Some((name, constraint)) = query_constraint {
            self.set_query_param(name, constraint);
        }
        if let Some(constraint) = body_constraint {
            self.set_body_constraint(constraint);
        }
        self.bind(index, binding)
    }

    /// Set the binding for one positional slot. Re-binding the same index
    /// replaces the previous entry and never disturbs any other index.
    pub fn bind(&mut self, index: usize, binding: ArgumentBinding) -> &mut Self {
        debug!(index, binding = ?binding, "argument binding declared");
        self.args.insert(index, binding);
        self
    }

    /// Merge a constraint fragment for the named path parameter.
    pub fn set_path_param(
        &mut self,
        name: impl Into<String>,
        constraint: ParameterConstraint,
    ) -> &mut Self {
        self.path_params
            .entry(name.into())
            .or_default()
            .merge(constraint);
        self
    }

    /// Merge a constraint fragment for the named query parameter.
    pub fn set_query_param(
        &mut self,
        name: impl Into<String>,
        constraint: ParameterConstraint,
    ) -> &mut Self {
        self.query_params
            .entry(name.into())
            .or_default()
            .merge(constraint);
        self
    }

    /// Merge a fragment into the request body constraint.
    pub fn set_body_constraint(&mut self, constraint: BodyConstraint) -> &mut Self {
        self.body.get_or_insert_with(BodyConstraint::default).merge(constraint);
        self
    }

    /// Number of positional slots declared so far.
    #[must_use]
    pub fn declared_args(&self) -> usize {
        self.args.len()
    }

    /// Finalize into an immutable [`MethodMetadata`].
    ///
    /// The index map densifies into an ordered list covering every position
    /// up to the highest declared index; a hole becomes
    /// [`ArgumentBinding::Unbound`] and resolves to an absent argument at
    /// request time.
    #[must_use]
    pub fn finalize(&self) -> MethodMetadata {
        let len = self.args.keys().next_back().map_or(0, |max| max + 1);
        let mut args = vec![ArgumentBinding::Unbound; len];
        for (index, binding) in &self.args {
            args[*index] = binding.clone();
        }
        MethodMetadata {
            args,
            path_params: self.path_params.clone(),
            query_params: self.query_params.clone(),
            body: self.body.clone().unwrap_or_default(),
        }
    }
}

/// Finalized, read-only per-method metadata: the ordered argument bindings,
/// the named constraint maps, and the body constraint. Held for the lifetime
/// of the process once a handler has been compiled from it.
#[derive(Debug, Clone, Default)]
pub struct MethodMetadata {
    /// Argument bindings in positional order, dense.
    pub args: Vec<ArgumentBinding>,
    /// Constraints keyed by path parameter name.
    pub path_params: HashMap<String, ParameterConstraint>,
    /// Constraints keyed by query parameter name.
    pub query_params: HashMap<String, ParameterConstraint>,
    /// Constraint on the whole request payload.
    pub body: BodyConstraint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_bind_densifies_with_unbound_holes() {
        let mut builder = MethodMetadataBuilder::new();
        builder.bind(2, ArgumentBinding::Body);
        builder.bind(0, ArgumentBinding::PathParam("id".into()));
        let meta = builder.finalize();
        assert_eq!(meta.args.len(), 3);
        assert!(matches!(meta.args[0], ArgumentBinding::PathParam(_)));
        assert!(matches!(meta.args[1], ArgumentBinding::Unbound));
        assert!(matches!(meta.args[2], ArgumentBinding::Body));
    }

    #[test]
    fn test_constraint_fragments_merge_without_clobbering() {
        let mut builder = MethodMetadataBuilder::new();
        builder.set_query_param(
            "limit",
            ParameterConstraint {
                schema: Some(json!({"type": "integer"})),
                required: None,
            },
        );
        builder.set_query_param(
            "limit",
            ParameterConstraint {
                schema: None,
                required: Some(true),
            },
        );
        let meta = builder.finalize();
        let limit = &meta.query_params["limit"];
        assert_eq!(limit.schema, Some(json!({"type": "integer"})));
        assert_eq!(limit.required, Some(true));
    }

    #[test]
    fn test_rebinding_an_index_leaves_others_alone() {
        let mut builder = MethodMetadataBuilder::new();
        builder.bind(0, ArgumentBinding::Request);
        builder.bind(1, ArgumentBinding::QueryParam("q".into()));
        builder.bind(0, ArgumentBinding::Body);
        let meta = builder.finalize();
        assert!(matches!(meta.args[0], ArgumentBinding::Body));
        assert!(matches!(meta.args[1], ArgumentBinding::QueryParam(_)));
    }
}
