//! The HTTP gateway seam and its reqwest-backed implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::{FetchError, RequestBuilder, Response};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can execute an HTTP request.
///
/// Implementations return `Ok` for any response the server produced, whatever
/// its status; status mapping happens in [`crate::ApiClient`].
#[async_trait]
pub trait HttpGateway: Send + Sync {
    /// Execute a request and return the raw response.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError>;
}

/// HTTP client for making outbound requests.
///
/// A thin wrapper around `reqwest` with a base URL, default headers and a
/// per-request timeout.
#[derive(Debug, Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    timeout: Duration,
    http: reqwest::Client,
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchClient {
    /// Create a new HTTP client.
    pub fn new() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            base_url: None,
            default_headers,
            timeout: DEFAULT_TIMEOUT,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve a request path against the base URL.
    pub fn resolve_url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => {
                if path.starts_with("http://") || path.starts_with("https://") {
                    path.to_string()
                } else {
                    format!("{}{}", base.trim_end_matches('/'), path)
                }
            }
            None => path.to_string(),
        }
    }
}

#[async_trait]
impl HttpGateway for FetchClient {
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let url = self.resolve_url(&request.path);
        let mut builder = self.http.request(request.method.into(), url.as_str());

        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(self.timeout);
        }

        for (key, value) in &self.default_headers {
            if !request.headers.keys().any(|k| k.eq_ignore_ascii_case(key)) {
                builder = builder.header(key.as_str(), value.as_str());
            }
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response::new(status, headers, body))
    }
}
