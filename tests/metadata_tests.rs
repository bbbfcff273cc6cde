//! Tests for metadata accumulation and the identity-keyed registry.
//!
//! Declarations run in unspecified order at startup; these tests pin down
//! the accumulation contract: fragments merge without clobbering each other,
//! the final descriptor is independent of declaration order, and finalizing
//! a target nobody declared against fails at startup.

use bindery::declare::{
    body, path_param, query_param, request, response, BodySettings, PathParamSettings,
    QueryParamSettings,
};
use bindery::metadata::{ArgumentBinding, MetadataRegistry, MethodKey, MethodMetadataBuilder};
use bindery::middleware::TracingMiddleware;
use bindery::MetadataError;
use serde_json::json;
use std::sync::Arc;

struct PetController;
struct UserController;

fn limit_decl() -> (usize, bindery::declare::Declaration) {
    (
        1,
        query_param(
            "limit",
            QueryParamSettings {
                required: Some(true),
                schema: Some(json!({"type": "integer", "minimum": 1})),
            },
        ),
    )
}

fn offset_decl() -> (usize, bindery::declare::Declaration) {
    (
        2,
        query_param(
            "offset",
            QueryParamSettings {
                required: None,
                schema: Some(json!({"type": "integer", "default": 0})),
            },
        ),
    )
}

fn verbose_decl() -> (usize, bindery::declare::Declaration) {
    (
        3,
        query_param(
            "verbose",
            QueryParamSettings {
                required: None,
                schema: Some(json!({"type": "boolean"})),
            },
        ),
    )
}

fn body_decl() -> (usize, bindery::declare::Declaration) {
    (
        0,
        body(BodySettings {
            required: Some(true),
            schema: Some(json!({"type": "object"})),
        }),
    )
}

#[test]
fn test_merge_order_independence() {
    // A body constraint and three query constraints, declared in every
    // rotation, must converge on the same descriptor.
    let declarations: Vec<fn() -> (usize, bindery::declare::Declaration)> =
        vec![body_decl, limit_decl, offset_decl, verbose_decl];

    let mut finalized = Vec::new();
    for rotation in 0..declarations.len() {
        let mut builder = MethodMetadataBuilder::new();
        for i in 0..declarations.len() {
            let (index, decl) = declarations[(rotation + i) % declarations.len()]();
            builder.declare(index, decl);
        }
        finalized.push(builder.finalize());
    }

    let first = &finalized[0];
    for other in &finalized[1..] {
        assert_eq!(first.body, other.body);
        assert_eq!(first.query_params, other.query_params);
        assert_eq!(first.args.len(), other.args.len());
    }
    assert_eq!(first.query_params.len(), 3);
    assert_eq!(first.body.required, Some(true));
}

#[test]
fn test_split_fragments_for_one_parameter_both_survive() {
    // One declaration contributes the schema, a separate one the required
    // flag; neither erases the other regardless of order.
    let mut a = MethodMetadataBuilder::new();
    a.set_query_param(
        "limit",
        bindery::ParameterConstraint {
            schema: Some(json!({"type": "integer"})),
            required: None,
        },
    );
    a.set_query_param(
        "limit",
        bindery::ParameterConstraint {
            schema: None,
            required: Some(true),
        },
    );

    let mut b = MethodMetadataBuilder::new();
    b.set_query_param(
        "limit",
        bindery::ParameterConstraint {
            schema: None,
            required: Some(true),
        },
    );
    b.set_query_param(
        "limit",
        bindery::ParameterConstraint {
            schema: Some(json!({"type": "integer"})),
            required: None,
        },
    );

    assert_eq!(a.finalize().query_params["limit"], b.finalize().query_params["limit"]);
}

#[test]
fn test_sparse_declaration_finalizes_dense() {
    let mut builder = MethodMetadataBuilder::new();
    builder.declare(3, request());
    builder.declare(
        0,
        path_param(
            "id",
            PathParamSettings {
                schema: Some(json!({"type": "integer"})),
            },
        ),
    );
    let meta = builder.finalize();
    assert_eq!(meta.args.len(), 4);
    assert!(matches!(meta.args[0], ArgumentBinding::PathParam(_)));
    assert!(matches!(meta.args[1], ArgumentBinding::Unbound));
    assert!(matches!(meta.args[2], ArgumentBinding::Unbound));
    assert!(matches!(meta.args[3], ArgumentBinding::Request));
}

#[test]
fn test_registry_keys_by_identity_not_name() {
    let mut registry = MetadataRegistry::new();
    registry
        .method(MethodKey::of::<PetController>("list"))
        .declare(0, query_param("limit", QueryParamSettings::default()));
    registry
        .method(MethodKey::of::<UserController>("list"))
        .declare(0, body(BodySettings::default()));

    let pets = registry
        .finalize_method(&MethodKey::of::<PetController>("list"))
        .expect("pet metadata");
    let users = registry
        .finalize_method(&MethodKey::of::<UserController>("list"))
        .expect("user metadata");

    assert!(matches!(pets.args[0], ArgumentBinding::QueryParam(_)));
    assert!(matches!(users.args[0], ArgumentBinding::Body));
}

#[test]
fn test_finalize_undeclared_target_is_a_startup_error() {
    let registry = MetadataRegistry::new();
    let err = registry
        .finalize_method(&MethodKey::of::<PetController>("missing"))
        .unwrap_err();
    match err {
        MetadataError::UnknownTarget { target } => {
            assert!(target.contains("missing"));
        }
        other => panic!("expected UnknownTarget, got {other:?}"),
    }
}

#[test]
fn test_controller_metadata_accumulates() {
    let mut registry = MetadataRegistry::new();
    registry
        .controller::<PetController>()
        .set_base_path("/pets")
        .add_middleware(Arc::new(TracingMiddleware))
        .require_middleware("list");
    registry.controller::<PetController>().require_middleware("get");

    let meta = registry
        .controller_metadata::<PetController>()
        .expect("controller metadata");
    assert_eq!(meta.base_path, "/pets");
    assert_eq!(meta.middleware.len(), 1);
    assert_eq!(meta.middleware_methods, vec!["list".to_string(), "get".to_string()]);
    assert!(registry.controller_metadata::<UserController>().is_none());
}

#[test]
fn test_registry_enumerates_methods_for_mounting() {
    let mut registry = MetadataRegistry::new();
    registry
        .method(MethodKey::of::<PetController>("list"))
        .declare(0, response());
    registry
        .method(MethodKey::of::<PetController>("get"))
        .declare(0, request());
    registry
        .method(MethodKey::of::<UserController>("get"))
        .declare(0, request());

    let mut names: Vec<_> = registry
        .methods_of::<PetController>()
        .map(|k| k.method_name())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["get", "list"]);
    assert_eq!(registry.len(), 3);
}
