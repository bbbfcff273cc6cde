use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before spilling to the heap. Most results carry a
/// handful of headers at most.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage. Header names are often repeated across
/// results (`content-type`, `location`), so names are `Arc<str>` and cloning
/// one is an atomic increment rather than a string copy.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The value a controller method returns: an explicit wrapper carrying the
/// status code, extra headers, and the serializable body.
///
/// A plain body with nothing else set renders as HTTP 200 with no extra
/// headers. Construct with [`MethodResult::ok`] / [`MethodResult::json`] and
/// refine with [`MethodResult::with_status`] / [`MethodResult::set_header`].
#[derive(Debug, Clone, Serialize)]
pub struct MethodResult {
    /// HTTP status code for the response.
    pub status: u16,
    /// Extra response headers to apply before the body is sent.
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body, serialized as JSON by the transport.
    pub body: Value,
}

impl Default for MethodResult {
    fn default() -> Self {
        MethodResult {
            status: 200,
            headers: HeaderVec::new(),
            body: Value::Null,
        }
    }
}

impl MethodResult {
    /// A 200 response with the given body and no extra headers.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        MethodResult {
            status: 200,
            headers: HeaderVec::new(),
            body,
        }
    }

    /// A response with an explicit status and body.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        MethodResult {
            status,
            headers: HeaderVec::new(),
            body,
        }
    }

    /// An error response with a JSON `{"error": message}` body.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Replace the status code.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value.into());
        self
    }

    /// Add or replace a header (case-insensitive on the name).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Look up a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl From<Value> for MethodResult {
    fn from(body: Value) -> Self {
        MethodResult::ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_200_with_no_headers() {
        let res = MethodResult::ok(json!({"ok": true}));
        assert_eq!(res.status, 200);
        assert!(res.headers.is_empty());
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = MethodResult::default();
        res.set_header("X-Token", "a".to_string());
        res.set_header("x-token", "b".to_string());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("X-TOKEN"), Some("b"));
    }
}
