use std::sync::Arc;

use crate::middleware::Middleware;

/// Per-controller metadata: the route prefix the mounting step hangs the
/// controller's methods under, the middleware chain, and which methods the
/// middleware applies to (all of them when the list is empty).
///
/// Lives outside the per-method argument system but follows the same
/// accumulation discipline: fragments deep-merge into a lazily-initialized
/// record attached to the controller type.
#[derive(Clone, Default)]
pub struct ControllerMetadata {
    /// Route prefix for every method on the controller.
    pub base_path: String,
    /// Middleware applied around this controller's handlers.
    pub middleware: Vec<Arc<dyn Middleware>>,
    /// Names of the methods the middleware applies to; empty means all.
    pub middleware_methods: Vec<String>,
}

impl std::fmt::Debug for ControllerMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerMetadata")
            .field("base_path", &self.base_path)
            .field("middleware_count", &self.middleware.len())
            .field("middleware_methods", &self.middleware_methods)
            .finish()
    }
}

/// Accumulator for [`ControllerMetadata`], mirroring the method-level
/// builder: discrete setters, later fragments never erase earlier ones.
#[derive(Clone, Default)]
pub struct ControllerMetadataBuilder {
    base_path: Option<String>,
    middleware: Vec<Arc<dyn Middleware>>,
    middleware_methods: Vec<String>,
}

impl std::fmt::Debug for ControllerMetadataBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerMetadataBuilder")
            .field("base_path", &self.base_path)
            .field("middleware_count", &self.middleware.len())
            .field("middleware_methods", &self.middleware_methods)
            .finish()
    }
}

impl ControllerMetadataBuilder {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the route prefix. A later declaration replaces an earlier one.
    pub fn set_base_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.base_path = Some(path.into());
        self
    }

    /// Append middleware to the chain, preserving declaration order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.push(mw);
        self
    }

    /// Record that the named method takes the controller middleware.
    pub fn require_middleware(&mut self, method: impl Into<String>) -> &mut Self {
        let method = method.into();
        if !self.middleware_methods.contains(&method) {
            self.middleware_methods.push(method);
        }
        self
    }

    /// Finalize into an immutable [`ControllerMetadata`].
    #[must_use]
    pub fn finalize(&self) -> ControllerMetadata {
        ControllerMetadata {
            base_path: self.base_path.clone().unwrap_or_default(),
            middleware: self.middleware.clone(),
            middleware_methods: self.middleware_methods.clone(),
        }
    }
}
