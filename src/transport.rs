//! Interface to the host HTTP framework.
//!
//! This layer never parses raw bytes. The transport hands over an already
//! parsed [`RequestContext`] (string parameter maps, JSON body) and receives
//! the response through a [`ResponseHandle`]. Failures travel through an
//! [`ErrorSink`] instead of the normal dispatch path.

use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::error::RequestError;
use crate::response::MethodResult;

/// Strongly typed request identifier backed by ULID, used for log
/// correlation across the binding and dispatch layers.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestId(ulid::Ulid::from_string(s)?))
    }
}

/// Parsed request data supplied by the transport layer.
///
/// Path and query values arrive as strings; the body arrives already parsed
/// as JSON (or absent). Built by transport glue via the `with_*` methods.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request id for tracing and correlation.
    pub request_id: RequestId,
    /// HTTP method (GET, POST, ...).
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Path parameters extracted by the router.
    pub path_params: HashMap<String, String>,
    /// Query string parameters.
    pub query_params: HashMap<String, String>,
    /// HTTP headers (lowercase names).
    pub headers: HashMap<String, String>,
    /// Cookies parsed from the Cookie header.
    pub cookies: HashMap<String, String>,
    /// Request body parsed as JSON, if a payload was present.
    pub body: Option<Value>,
}

impl RequestContext {
    /// Create an empty context for the given method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        RequestContext {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            body: None,
        }
    }

    /// Set a path parameter, builder style.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Set a query parameter, builder style.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Set a header (name lowercased), builder style.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the parsed JSON body, builder style.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a path parameter by name.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Get a query parameter by name.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Get a cookie by name.
    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Parse query string parameters from a URL path.
///
/// Extracts everything after the `?` and URL-decodes names and values.
#[must_use]
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    match path.find('?') {
        Some(pos) => url::form_urlencoded::parse(path[pos + 1..].as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Parse cookies out of a header map with lowercase names.
#[must_use]
pub fn parse_cookies(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .get("cookie")
        .map(|c| {
            c.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim().to_string();
                    let value = parts.next().unwrap_or("").trim().to_string();
                    Some((name, value))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct ResponseState {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    completed: bool,
}

/// Shared handle onto the transport's response object.
///
/// A method bound with the raw `Response` binding receives a clone and may
/// write the response itself; the compiled handler checks
/// [`ResponseHandle::is_completed`] afterwards and skips result application
/// when it did. Transports read the final state back out with the snapshot
/// getters.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    inner: Arc<Mutex<ResponseState>>,
}

impl ResponseHandle {
    /// Create a fresh, unsent response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn set_status(&self, status: u16) {
        self.lock().status = Some(status);
    }

    /// Append a response header.
    pub fn set_header(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().headers.push((name.into(), value.into()));
    }

    /// Send the body and mark the response complete. Later sends are ignored;
    /// the first write wins.
    pub fn send(&self, body: Value) {
        let mut state = self.lock();
        if state.completed {
            return;
        }
        state.body = Some(body);
        state.completed = true;
    }

    /// Whether a body has been sent.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.lock().completed
    }

    /// Apply a [`MethodResult`] to this response: headers first, then status,
    /// then the body. No-op when the response was already completed.
    pub fn complete(&self, result: MethodResult) {
        let mut state = self.lock();
        if state.completed {
            return;
        }
        for (name, value) in &result.headers {
            state.headers.push((name.to_string(), value.clone()));
        }
        state.status = Some(result.status);
        state.body = Some(result.body);
        state.completed = true;
    }

    /// Status snapshot; `200` when nothing set one explicitly.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.lock().status.unwrap_or(200)
    }

    /// Header snapshot.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        self.lock().headers.clone()
    }

    /// Body snapshot, if one was sent.
    #[must_use]
    pub fn body(&self) -> Option<Value> {
        self.lock().body.clone()
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, ResponseState> {
        self.inner.lock().expect("response handle lock poisoned")
    }
}

/// The error propagation channel: the compiled handler forwards classified
/// failures here instead of writing a response itself, leaving rendering to
/// the transport layer.
pub trait ErrorSink: Send + Sync {
    /// Receive a terminal failure for the current request.
    fn forward(&self, err: RequestError);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=hello%20world");
        assert_eq!(q.get("x"), Some(&"1".to_string()));
        assert_eq!(q.get("y"), Some(&"hello world".to_string()));
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_parse_cookies() {
        let mut h = HashMap::new();
        h.insert("cookie".to_string(), "a=b; c=d".to_string());
        let cookies = parse_cookies(&h);
        assert_eq!(cookies.get("a"), Some(&"b".to_string()));
        assert_eq!(cookies.get("c"), Some(&"d".to_string()));
    }

    #[test]
    fn test_response_handle_first_write_wins() {
        let res = ResponseHandle::new();
        res.send(json!("first"));
        res.complete(MethodResult::json(500, json!("second")));
        assert_eq!(res.body(), Some(json!("first")));
        assert_eq!(res.status(), 200);
    }

    #[test]
    fn test_complete_applies_headers_status_body() {
        let res = ResponseHandle::new();
        let result = MethodResult::json(201, json!({"id": 1})).with_header("location", "/pets/1");
        res.complete(result);
        assert_eq!(res.status(), 201);
        assert_eq!(res.headers(), vec![("location".to_string(), "/pets/1".to_string())]);
        assert_eq!(res.body(), Some(json!({"id": 1})));
    }
}
