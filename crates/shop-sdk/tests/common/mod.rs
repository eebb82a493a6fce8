#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use shop_sdk::prelude::*;
use shop_sdk::shop_cache::FileStore;
use shop_sdk::shop_data::mock::MockGateway;
use shop_sdk::shop_data::Method;

pub const SUCCESS: &str = "http://localhost:3000/payment/success";
pub const FAIL: &str = "http://localhost:3000/payment/fail";

/// Widget that records every hand-off.
#[derive(Clone, Default)]
pub struct RecordingWidget {
    calls: Arc<Mutex<Vec<GatewayRequest>>>,
}

impl RecordingWidget {
    pub fn calls(&self) -> Vec<GatewayRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentWidget for RecordingWidget {
    async fn request_payment(&self, request: &GatewayRequest) -> Result<(), WidgetError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(())
    }
}

pub fn token_for(user_id: i64) -> String {
    let claims = json!({
        "sub": "kim@example.com",
        "userId": user_id,
        "exp": 4_102_444_800_i64
    });
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.sig",
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

pub struct Harness {
    pub mock: MockGateway,
    pub widget: RecordingWidget,
    pub store: FileStore,
    pub shop: Storefront,
    _dir: Arc<tempfile::TempDir>,
}

impl Harness {
    pub fn new() -> Self {
        let dir = Arc::new(tempfile::tempdir().unwrap());
        let mock = MockGateway::new();
        mock.respond(
            Method::Post,
            "/api/users/login",
            200,
            json!({"accessToken": token_for(5)}),
        );
        mock.respond(
            Method::Get,
            "/api/users/5",
            200,
            json!({"id": 5, "email": "kim@example.com", "name": "Kim", "role": "USER"}),
        );
        Self::with(mock, dir)
    }

    fn with(mock: MockGateway, dir: Arc<tempfile::TempDir>) -> Self {
        let store = FileStore::open(dir.path()).unwrap();
        let widget = RecordingWidget::default();
        let shop = Storefront::builder(StorefrontConfig::default())
            .gateway(mock.clone())
            .store(store.clone())
            .widget(widget.clone())
            .build()
            .unwrap();
        Self {
            mock,
            widget,
            store,
            shop,
            _dir: dir,
        }
    }

    /// Same persisted profile and backend, fresh in-memory state, as after a
    /// full page load.
    pub async fn reload(&self) -> Self {
        let reloaded = Self::with(self.mock.clone(), self._dir.clone());
        reloaded.shop.session().restore().await;
        reloaded
    }

    pub async fn login(&self) {
        self.shop
            .session()
            .login("kim@example.com", "password1")
            .await
            .unwrap();
    }

    pub fn stored(&self, key: &str) -> Option<serde_json::Value> {
        shop_sdk::shop_cache::Cache::new(self.store.clone())
            .get(key)
            .unwrap()
    }
}

pub fn product(id: i64, name: &str, price: i64) -> Product {
    Product::new(id, name, price)
}

pub fn address() -> ShippingAddress {
    ShippingAddress::new("Kim", "010-1234-5678", "1 Main St")
}
