use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::response::MethodResult;
use crate::transport::RequestContext;

/// Logs one structured event per request on the way in and on the way out,
/// keyed by the request id for correlation.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &RequestContext) -> Option<MethodResult> {
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            "request received"
        );
        None
    }

    fn after(&self, req: &RequestContext, res: &mut MethodResult, latency: Duration) {
        info!(
            request_id = %req.request_id,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "request completed"
        );
    }
}
