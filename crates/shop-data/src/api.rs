//! Typed JSON client over an [`HttpGateway`].

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{FetchError, HttpGateway, Method, RequestBuilder};

/// JSON API client shared by every backend-facing service.
///
/// Clones share the gateway and the bearer-token slot, so setting the token on
/// one handle authenticates all of them.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<dyn HttpGateway>,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a client over a gateway.
    pub fn new(gateway: impl HttpGateway + 'static) -> Self {
        Self::from_shared(Arc::new(gateway))
    }

    /// Create a client over an already shared gateway.
    pub fn from_shared(gateway: Arc<dyn HttpGateway>) -> Self {
        Self {
            gateway,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Set or clear the bearer token attached to every request.
    pub fn set_bearer_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// The current bearer token.
    pub fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Send a request and decode the JSON answer.
    ///
    /// Non-2xx answers become [`FetchError::Http`].
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = RequestBuilder::new(method, path).accept("application/json");
        if let Some(body) = body {
            request = request.json(body)?;
        }
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        tracing::debug!(%method, path, "sending request");
        let response = match self.gateway.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "request failed");
                return Err(e);
            }
        };
        tracing::debug!(%method, path, status = response.status, "received response");

        let response = response.error_for_status().inspect_err(|e| {
            tracing::warn!(%method, path, error = %e, "backend rejected request");
        })?;
        response.json()
    }

    /// `GET path`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.request::<T, ()>(Method::Get, path, None).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Post, path, Some(body)).await
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Patch, path, Some(body)).await
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("authenticated", &self.bearer_token().is_some())
            .finish_non_exhaustive()
    }
}
