use std::time::Duration;

use crate::response::MethodResult;
use crate::transport::RequestContext;

/// Hook pair run around handler dispatch.
///
/// `before` may short-circuit with an early result, in which case the
/// handler is never invoked. `after` sees every result on its way out.
pub trait Middleware: Send + Sync {
    /// Inspect the request before dispatch; return `Some` to answer it
    /// without invoking the handler.
    fn before(&self, _req: &RequestContext) -> Option<MethodResult> {
        None
    }

    /// Observe or amend the result after dispatch.
    fn after(&self, _req: &RequestContext, _res: &mut MethodResult, _latency: Duration) {}
}
