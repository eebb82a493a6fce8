//! Scripted in-memory gateway for tests and offline demos.
//!
//! ```rust
//! use shop_data::mock::MockGateway;
//! use shop_data::Method;
//!
//! let mock = MockGateway::new();
//! mock.respond(Method::Get, "/api/products", 200, serde_json::json!([]));
//! assert_eq!(mock.request_count(Method::Get, "/api/products"), 0);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::{FetchError, HttpGateway, Method, RequestBuilder, Response};

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<serde_json::Value>,
}

impl RecordedRequest {
    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
    }
}

type Reply = Result<Response, FetchError>;

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

/// Gateway answering from per-route reply queues.
///
/// Replies for a route are consumed in order; the last one repeats. Requests
/// without a scripted route get a `404`.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Create a mock with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply for `method path`.
    pub fn respond(
        &self,
        method: Method,
        path: impl Into<String>,
        status: u16,
        body: serde_json::Value,
    ) -> &Self {
        self.push(method, path.into(), Ok(Response::json_body(status, &body)))
    }

    /// Queue a transport-level failure for `method path`.
    pub fn fail(&self, method: Method, path: impl Into<String>, error: FetchError) -> &Self {
        self.push(method, path.into(), Err(error))
    }

    fn push(&self, method: Method, path: String, reply: Reply) -> &Self {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.routes.entry((method, path)).or_default().push_back(reply);
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.requests.clone()
    }

    /// Requests received for `method path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Number of requests received for `method path`.
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

#[async_trait]
impl HttpGateway for MockGateway {
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.requests.push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
            headers: request.headers.clone(),
            body: request.body_json(),
        });

        let key = (request.method, request.path.clone());
        match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Ok(Response::new(404, HashMap::new(), Vec::new()))),
            Some(queue) => match queue.front() {
                Some(reply) => reply.clone(),
                None => Ok(not_found(&request)),
            },
            None => Ok(not_found(&request)),
        }
    }
}

fn not_found(request: &RequestBuilder) -> Response {
    Response::json_body(
        404,
        &serde_json::json!({
            "message": format!("no mock for {} {}", request.method, request.path)
        }),
    )
}
