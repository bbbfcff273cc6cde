use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::response::MethodResult;
use crate::transport::RequestContext;

/// Request counters updated with atomics; no locks, safe to share across
/// every handler coroutine.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
}

impl MetricsMiddleware {
    /// Create a middleware with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests observed.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Requests that completed with a 4xx or 5xx status.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean latency across all observed requests.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed);
        if count == 0 {
            return Duration::ZERO;
        }
        let total = self.total_latency_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total / count as u64)
    }
}

impl Middleware for MetricsMiddleware {
    fn after(&self, _req: &RequestContext, res: &mut MethodResult, latency: Duration) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        if res.status >= 400 {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_counters() {
        let metrics = MetricsMiddleware::new();
        let req = RequestContext::new(Method::GET, "/pets");
        let mut ok = MethodResult::default();
        let mut err = MethodResult::error(500, "boom");
        metrics.after(&req, &mut ok, Duration::from_millis(2));
        metrics.after(&req, &mut err, Duration::from_millis(4));
        assert_eq!(metrics.request_count(), 2);
        assert_eq!(metrics.error_count(), 1);
        assert_eq!(metrics.average_latency(), Duration::from_millis(3));
    }
}
