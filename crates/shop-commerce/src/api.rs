//! Typed access to the backend's order, payment and product endpoints.

use reqwest::Url;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use shop_data::ApiClient;

use crate::catalog::Product;
use crate::checkout::{DraftOrder, Order, OrderAck, OrderRoute, OrderStatus};
use crate::ids::{OrderId, PaymentId, PaymentKey, ProductId, UserId};
use crate::money::deserialize_optional_amount;
use crate::CommerceError;

/// Body of `POST /api/payments/confirm`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub payment_key: String,
    pub order_id: String,
    pub amount: i64,
}

impl ConfirmPaymentRequest {
    pub fn new(payment_key: &PaymentKey, order_id: &OrderId, amount: i64) -> Self {
        Self {
            payment_key: payment_key.to_string(),
            order_id: order_id.to_string(),
            amount,
        }
    }
}

/// A payment record. The backend's shape varies, so every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Payment {
    #[serde(alias = "paymentId")]
    pub id: Option<PaymentId>,
    pub payment_key: Option<String>,
    pub order_id: Option<OrderId>,
    pub status: Option<String>,
    pub method: Option<String>,
    #[serde(alias = "totalAmount", deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<i64>,
    pub approved_at: Option<String>,
}

/// Order endpoints under `/api/orders`.
#[derive(Debug, Clone)]
pub struct OrderApi {
    client: ApiClient,
}

impl OrderApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /api/orders`
    pub async fn create(&self, draft: &DraftOrder) -> Result<OrderAck, CommerceError> {
        self.submit(draft, OrderRoute::Orders).await
    }

    /// `POST /api/payments/prepare`
    pub async fn prepare(&self, draft: &DraftOrder) -> Result<OrderAck, CommerceError> {
        self.submit(draft, OrderRoute::PaymentPrepare).await
    }

    /// Create the order through `route`.
    pub async fn submit(
        &self,
        draft: &DraftOrder,
        route: OrderRoute,
    ) -> Result<OrderAck, CommerceError> {
        // Some backends answer 201 with an empty body.
        let ack: Option<OrderAck> = self.client.post(route.path(), draft).await?;
        Ok(ack.unwrap_or_default())
    }

    /// `GET /api/orders/{id}`
    pub async fn get(&self, id: &OrderId) -> Result<Order, CommerceError> {
        Ok(self.client.get(&format!("/api/orders/{id}")).await?)
    }

    /// `GET /api/orders/user/{userId}`
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        Ok(self
            .client
            .get(&format!("/api/orders/user/{user_id}"))
            .await?)
    }

    /// `GET /api/orders` (admin).
    pub async fn list_all(&self) -> Result<Vec<Order>, CommerceError> {
        Ok(self.client.get("/api/orders").await?)
    }

    /// `PATCH /api/orders/{id}/status` with body `{"status": ...}`.
    pub async fn update_status(
        &self,
        id: &OrderId,
        status: &OrderStatus,
    ) -> Result<(), CommerceError> {
        let body = serde_json::json!({ "status": status.as_str() });
        let _: IgnoredAny = self
            .client
            .patch(&format!("/api/orders/{id}/status"), &body)
            .await?;
        Ok(())
    }
}

/// Payment endpoints under `/api/payments`.
#[derive(Debug, Clone)]
pub struct PaymentApi {
    client: ApiClient,
}

impl PaymentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /api/payments/confirm`
    pub async fn confirm(&self, request: &ConfirmPaymentRequest) -> Result<Payment, CommerceError> {
        let payment: Option<Payment> = self.client.post("/api/payments/confirm", request).await?;
        Ok(payment.unwrap_or_default())
    }

    /// `POST /api/payments/{id}/cancel` with body `{"reason": ...}`.
    pub async fn cancel(&self, id: &PaymentId, reason: &str) -> Result<(), CommerceError> {
        let body = serde_json::json!({ "reason": reason });
        let _: IgnoredAny = self
            .client
            .post(&format!("/api/payments/{id}/cancel"), &body)
            .await?;
        Ok(())
    }

    /// `GET /api/payments/user/{userId}`
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Payment>, CommerceError> {
        Ok(self
            .client
            .get(&format!("/api/payments/user/{user_id}"))
            .await?)
    }

    /// `GET /api/payments/{id}`
    pub async fn get(&self, id: &PaymentId) -> Result<Payment, CommerceError> {
        Ok(self.client.get(&format!("/api/payments/{id}")).await?)
    }
}

/// Product endpoints under `/api/products`.
#[derive(Debug, Clone)]
pub struct ProductApi {
    client: ApiClient,
}

impl ProductApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /api/products`
    pub async fn list(&self) -> Result<Vec<Product>, CommerceError> {
        Ok(self.client.get("/api/products").await?)
    }

    /// `GET /api/products/{id}`
    pub async fn get(&self, id: &ProductId) -> Result<Product, CommerceError> {
        Ok(self.client.get(&format!("/api/products/{id}")).await?)
    }

    /// `GET /api/products/search?keyword=...`
    pub async fn search(&self, keyword: &str) -> Result<Vec<Product>, CommerceError> {
        let path = api_path(&["api", "products", "search"], &[("keyword", keyword.trim())])?;
        Ok(self.client.get(&path).await?)
    }

    /// `GET /api/products/category/{category}`
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>, CommerceError> {
        let path = api_path(&["api", "products", "category", category], &[])?;
        Ok(self.client.get(&path).await?)
    }

    /// `GET /api/products/available`: products currently on sale.
    pub async fn available(&self) -> Result<Vec<Product>, CommerceError> {
        Ok(self.client.get("/api/products/available").await?)
    }
}

/// Build an origin-relative path with each segment and query value escaped.
fn api_path(segments: &[&str], query: &[(&str, &str)]) -> Result<String, CommerceError> {
    let invalid = |reason: String| CommerceError::Serialization(format!("invalid path: {reason}"));
    let mut url = Url::parse("http://localhost/").map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("base cannot hold a path".to_string()))?
        .pop_if_empty()
        .extend(segments);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{Customer, PaymentMethod, ShippingAddress};
    use crate::Cart;
    use serde_json::json;
    use shop_data::mock::MockGateway;
    use shop_data::Method;

    fn client() -> (ApiClient, MockGateway) {
        let mock = MockGateway::new();
        (ApiClient::new(mock.clone()), mock)
    }

    fn draft() -> DraftOrder {
        let mut cart = Cart::default();
        cart.add_item(&Product::new("1", "Keyboard", 15000));
        DraftOrder::from_cart(
            &cart,
            &Customer::new(UserId::from(5)),
            ShippingAddress::new("Kim", "010", "1 Main St"),
            PaymentMethod::Card,
        )
    }

    #[tokio::test]
    async fn test_create_and_prepare_routes() {
        let (client, mock) = client();
        mock.respond(Method::Post, "/api/orders", 201, json!({"id": 77}));
        mock.respond(Method::Post, "/api/payments/prepare", 200, json!({"orderId": "78"}));
        let orders = OrderApi::new(client);

        let ack = orders.create(&draft()).await.unwrap();
        assert_eq!(ack.assigned_id().map(OrderId::as_str), Some("77"));
        let ack = orders.prepare(&draft()).await.unwrap();
        assert_eq!(ack.assigned_id().map(OrderId::as_str), Some("78"));
    }

    #[tokio::test]
    async fn test_create_with_empty_body_has_no_id() {
        let (client, mock) = client();
        mock.respond(Method::Post, "/api/orders", 201, serde_json::Value::Null);
        let ack = OrderApi::new(client).create(&draft()).await.unwrap();
        assert!(ack.assigned_id().is_none());
    }

    #[tokio::test]
    async fn test_list_all_orders() {
        let (client, mock) = client();
        mock.respond(
            Method::Get,
            "/api/orders",
            200,
            json!([
                {"id": 1, "userId": 5, "status": "PAID", "totalAmount": 1000},
                {"id": 2, "userId": 6, "status": "DELIVERED", "totalAmount": 2000}
            ]),
        );

        let orders = OrderApi::new(client).list_all().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(!orders[0].status.is_terminal());
        assert!(orders[1].status.is_terminal());
        assert_eq!(mock.request_count(Method::Get, "/api/orders"), 1);
    }

    #[tokio::test]
    async fn test_update_status_is_patch_with_body() {
        let (client, mock) = client();
        mock.respond(Method::Patch, "/api/orders/3/status", 200, json!({"id": 3}));
        OrderApi::new(client)
            .update_status(&OrderId::new("3"), &OrderStatus::Shipping)
            .await
            .unwrap();

        let sent = mock.requests_to(Method::Patch, "/api/orders/3/status");
        assert_eq!(sent[0].body, Some(json!({"status": "SHIPPING"})));
    }

    #[tokio::test]
    async fn test_confirm_sends_string_order_id() {
        let (client, mock) = client();
        mock.respond(
            Method::Post,
            "/api/payments/confirm",
            200,
            json!({"paymentId": 4, "status": "DONE", "totalAmount": 15000}),
        );
        let request =
            ConfirmPaymentRequest::new(&PaymentKey::new("pk"), &OrderId::new("77"), 15000);
        let payment = PaymentApi::new(client).confirm(&request).await.unwrap();

        assert_eq!(payment.amount, Some(15000));
        assert_eq!(payment.id.map(PaymentId::into_inner).as_deref(), Some("4"));
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"paymentKey": "pk", "orderId": "77", "amount": 15000}))
        );
    }

    #[tokio::test]
    async fn test_cancel_payment_sends_reason() {
        let (client, mock) = client();
        mock.respond(Method::Post, "/api/payments/4/cancel", 200, json!({}));
        PaymentApi::new(client)
            .cancel(&PaymentId::new("4"), "changed my mind")
            .await
            .unwrap();
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"reason": "changed my mind"}))
        );
    }

    #[tokio::test]
    async fn test_order_history_and_products() {
        let (client, mock) = client();
        mock.respond(
            Method::Get,
            "/api/orders/user/5",
            200,
            json!([{"id": 1, "status": "PAID", "totalAmount": 1000}]),
        );
        mock.respond(
            Method::Get,
            "/api/products",
            200,
            json!([{"id": 1, "name": "Keyboard", "price": 15000}]),
        );

        let orders = OrderApi::new(client.clone())
            .list_for_user(&UserId::from(5))
            .await
            .unwrap();
        assert_eq!(orders[0].status, OrderStatus::Paid);

        let products = ProductApi::new(client).list().await.unwrap();
        assert_eq!(products[0].name, "Keyboard");
    }

    #[tokio::test]
    async fn test_product_search_escapes_keyword() {
        let (client, mock) = client();
        mock.respond(
            Method::Get,
            "/api/products/search?keyword=wireless+mouse%26pad",
            200,
            json!([{"id": 2, "name": "Wireless Mouse", "price": 5000}]),
        );

        let products = ProductApi::new(client)
            .search(" wireless mouse&pad ")
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "2");
    }

    #[tokio::test]
    async fn test_products_by_category_and_available() {
        let (client, mock) = client();
        mock.respond(
            Method::Get,
            "/api/products/category/home%20office",
            200,
            json!([{"id": 1, "name": "Desk Lamp", "price": 20000, "category": "home office"}]),
        );
        mock.respond(Method::Get, "/api/products/available", 200, json!([]));

        let api = ProductApi::new(client);
        let lamps = api.by_category("home office").await.unwrap();
        assert_eq!(lamps[0].category.as_deref(), Some("home office"));
        assert!(api.available().await.unwrap().is_empty());
        assert_eq!(mock.request_count(Method::Get, "/api/products/available"), 1);
    }

    #[test]
    fn test_api_path() {
        assert_eq!(api_path(&["api", "products"], &[]).unwrap(), "/api/products");
        assert_eq!(
            api_path(&["api", "products", "category", "a/b"], &[]).unwrap(),
            "/api/products/category/a%2Fb"
        );
    }

    #[tokio::test]
    async fn test_backend_rejection_message() {
        let (client, mock) = client();
        mock.respond(
            Method::Get,
            "/api/orders/404",
            404,
            json!({"message": "Order not found"}),
        );
        let err = OrderApi::new(client)
            .get(&OrderId::new("404"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Order not found");
    }
}
