//! HTTP plumbing for the shopfront client.
//!
//! Requests flow through an [`HttpGateway`]: [`FetchClient`] talks to the real
//! backend over `reqwest`, [`mock::MockGateway`] answers from scripted replies.
//! [`ApiClient`] layers JSON encoding, bearer authentication and status mapping
//! on top of either.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_data::{ApiClient, FetchClient};
//!
//! let client = ApiClient::new(FetchClient::new().with_base_url("http://localhost:9090"));
//! client.set_bearer_token(Some(token));
//!
//! let products: Vec<Product> = client.get("/api/products").await?;
//! let order: OrderAck = client.post("/api/orders", &draft).await?;
//! ```

mod api;
mod error;
mod gateway;
pub mod mock;
mod request;
mod response;

pub use api::ApiClient;
pub use error::FetchError;
pub use gateway::{FetchClient, HttpGateway, DEFAULT_TIMEOUT};
pub use request::{Method, RequestBuilder};
pub use response::Response;
