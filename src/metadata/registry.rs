use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tracing::debug;

use super::controller::{ControllerMetadata, ControllerMetadataBuilder};
use super::method::{MethodMetadata, MethodMetadataBuilder};
use crate::error::MetadataError;

/// Identity of a controller method, used as the registry key.
///
/// Keyed by the controller's `TypeId` plus the method name, so two methods
/// with the same name on different controllers never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodKey {
    controller: TypeId,
    controller_name: &'static str,
    method: &'static str,
}

impl MethodKey {
    /// Key for `method` on controller type `C`.
    #[must_use]
    pub fn of<C: 'static>(method: &'static str) -> Self {
        MethodKey {
            controller: TypeId::of::<C>(),
            controller_name: std::any::type_name::<C>(),
            method,
        }
    }

    /// The method name.
    #[must_use]
    pub fn method_name(&self) -> &'static str {
        self.method
    }

    /// The controller type name.
    #[must_use]
    pub fn controller_name(&self) -> &'static str {
        self.controller_name
    }
}

impl Display for MethodKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.controller_name, self.method)
    }
}

/// Explicit registry mapping method identity to its metadata accumulator and
/// controller type to its controller-level accumulator.
///
/// Populated during the startup declaration phase, strictly before any
/// handler is compiled; read-only afterwards. This is also the registration
/// surface a route-mounting step consults: it can enumerate a controller's
/// declared methods and read the finalized metadata for each.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    methods: HashMap<MethodKey, MethodMetadataBuilder>,
    controllers: HashMap<TypeId, ControllerMetadataBuilder>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulator for the given method, lazily initialized on first
    /// declaration.
    pub fn method(&mut self, key: MethodKey) -> &mut MethodMetadataBuilder {
        self.methods.entry(key).or_insert_with(|| {
            debug!(target_method = %key, "method metadata initialized");
            MethodMetadataBuilder::new()
        })
    }

    /// The controller-level accumulator for type `C`, lazily initialized.
    pub fn controller<C: 'static>(&mut self) -> &mut ControllerMetadataBuilder {
        self.controllers
            .entry(TypeId::of::<C>())
            .or_insert_with(ControllerMetadataBuilder::new)
    }

    /// Finalize the metadata accumulated for `key`.
    ///
    /// # Errors
    ///
    /// [`MetadataError::UnknownTarget`] when nothing was ever declared for
    /// the key — a declaration-ordering or wiring mistake, surfaced at
    /// startup rather than request time.
    pub fn finalize_method(&self, key: &MethodKey) -> Result<MethodMetadata, MetadataError> {
        self.methods
            .get(key)
            .map(MethodMetadataBuilder::finalize)
            .ok_or_else(|| MetadataError::UnknownTarget {
                target: key.to_string(),
            })
    }

    /// Finalized controller metadata for type `C`, if any was declared.
    #[must_use]
    pub fn controller_metadata<C: 'static>(&self) -> Option<ControllerMetadata> {
        self.controllers
            .get(&TypeId::of::<C>())
            .map(ControllerMetadataBuilder::finalize)
    }

    /// Keys of every method declared on controller type `C`.
    pub fn methods_of<C: 'static>(&self) -> impl Iterator<Item = &MethodKey> {
        let controller = TypeId::of::<C>();
        self.methods.keys().filter(move |k| k.controller == controller)
    }

    /// Total number of methods with accumulated metadata.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether any method metadata has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PetController;
    struct UserController;

    #[test]
    fn test_same_method_name_different_controllers() {
        let a = MethodKey::of::<PetController>("list");
        let b = MethodKey::of::<UserController>("list");
        assert_ne!(a, b);
        assert_eq!(a, MethodKey::of::<PetController>("list"));
    }

    #[test]
    fn test_finalize_unknown_target_fails() {
        let registry = MetadataRegistry::new();
        let err = registry
            .finalize_method(&MethodKey::of::<PetController>("get_pet"))
            .unwrap_err();
        assert!(matches!(err, MetadataError::UnknownTarget { .. }));
    }

    #[test]
    fn test_methods_of_filters_by_controller() {
        let mut registry = MetadataRegistry::new();
        registry.method(MethodKey::of::<PetController>("list"));
        registry.method(MethodKey::of::<PetController>("get"));
        registry.method(MethodKey::of::<UserController>("list"));
        assert_eq!(registry.methods_of::<PetController>().count(), 2);
        assert_eq!(registry.methods_of::<UserController>().count(), 1);
    }
}
