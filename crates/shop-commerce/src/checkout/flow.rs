//! Checkout state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::api::OrderApi;
use crate::cart::CartStore;
use crate::checkout::{
    BankTransferInstructions, CheckoutConfig, Customer, DraftOrder, PaymentMethod,
    ShippingAddress,
};
use crate::ids::OrderId;
use crate::money::Money;
use crate::payment::{
    GatewayErrorCode, GatewayRequest, PaymentSession, PaymentSessionLedger, PaymentWidget,
    WidgetError, GENERIC_PAYMENT_ERROR,
};
use crate::CommerceError;

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CheckoutState {
    /// Reviewing the cart; `error` holds the last failure, if any.
    Idle { error: Option<String> },
    /// Checking the shipping address. No network call yet.
    ValidatingAddress,
    /// Order creation request in flight.
    CreatingOrder,
    /// The customer was handed to the card gateway. Ends with a redirect.
    AwaitingGatewayResult { session: PaymentSession },
    /// Bank transfer order placed; payment happens out of band.
    BankTransferPending {
        order_id: OrderId,
        amount: Money,
        instructions: BankTransferInstructions,
    },
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Idle { error: None }
    }
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle { .. } => "idle",
            CheckoutState::ValidatingAddress => "validating_address",
            CheckoutState::CreatingOrder => "creating_order",
            CheckoutState::AwaitingGatewayResult { .. } => "awaiting_gateway_result",
            CheckoutState::BankTransferPending { .. } => "bank_transfer_pending",
        }
    }

    /// A new submission must be refused in these states.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CheckoutState::ValidatingAddress
                | CheckoutState::CreatingOrder
                | CheckoutState::AwaitingGatewayResult { .. }
        )
    }

    /// The error shown in `Idle`, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            CheckoutState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }
}

/// How a successful submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Card payment handed to the gateway; confirmation arrives by redirect.
    AwaitingGateway { order_id: OrderId, amount: Money },
    /// Bank transfer order placed and the cart cleared.
    BankTransferPending {
        order_id: OrderId,
        amount: Money,
        instructions: BankTransferInstructions,
    },
}

impl CheckoutOutcome {
    pub fn order_id(&self) -> &OrderId {
        match self {
            CheckoutOutcome::AwaitingGateway { order_id, .. }
            | CheckoutOutcome::BankTransferPending { order_id, .. } => order_id,
        }
    }
}

/// Drives one checkout: validate the address, create the order, then hand
/// off to the gateway (card) or show transfer instructions (bank transfer).
///
/// An order is always created before any payment starts, and a payment is
/// never started without the order id the backend assigned. Clones share the
/// same state, so a second submit through any handle is refused while one is
/// in flight.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    cart: CartStore,
    orders: OrderApi,
    ledger: PaymentSessionLedger,
    widget: Arc<dyn PaymentWidget>,
    config: CheckoutConfig,
    state: Arc<Mutex<CheckoutState>>,
}

impl CheckoutOrchestrator {
    pub fn new(
        cart: CartStore,
        orders: OrderApi,
        ledger: PaymentSessionLedger,
        widget: Arc<dyn PaymentWidget>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            cart,
            orders,
            ledger,
            widget,
            config,
            state: Arc::new(Mutex::new(CheckoutState::default())),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CheckoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: CheckoutState) {
        tracing::debug!(state = state.as_str(), "checkout state");
        *self.lock_state() = state;
    }

    /// Return to `Idle` carrying `error`'s message.
    fn fail<T>(&self, error: CommerceError) -> Result<T, CommerceError> {
        self.abandon(&error);
        Err(error)
    }

    /// Current state.
    pub fn state(&self) -> CheckoutState {
        self.lock_state().clone()
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Back to a clean `Idle`, e.g. when the checkout page is opened again.
    pub fn reset(&self) {
        self.set_state(CheckoutState::default());
    }

    /// Back to `Idle` showing `error`, so the customer can start over.
    ///
    /// Used when a gateway redirect is rejected; the cart is left untouched.
    pub fn abandon(&self, error: &CommerceError) {
        tracing::warn!(error = %error, "checkout failed");
        self.set_state(CheckoutState::Idle {
            error: Some(error.to_string()),
        });
    }

    /// Submit the cart as an order.
    ///
    /// Refused with [`CommerceError::CheckoutInProgress`] while another
    /// submission is in flight. Validation failures, backend rejections and
    /// widget errors return to `Idle` with the message and leave the cart
    /// as it was.
    pub async fn submit(
        &self,
        customer: &Customer,
        address: ShippingAddress,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CommerceError> {
        {
            let mut state = self.lock_state();
            if state.is_in_flight() {
                tracing::debug!(state = state.as_str(), "checkout submit ignored");
                return Err(CommerceError::CheckoutInProgress);
            }
            *state = CheckoutState::ValidatingAddress;
        }

        if self.cart.is_empty() {
            return self.fail(CommerceError::EmptyCart);
        }
        if let Err(e) = address.validate() {
            return self.fail(e);
        }

        let cart = self.cart.snapshot();
        let amount = cart.total_amount();
        let draft = DraftOrder::from_cart(&cart, customer, address, method);

        self.set_state(CheckoutState::CreatingOrder);
        tracing::info!(
            user_id = %customer.user_id,
            amount = amount.amount,
            method = method.as_str(),
            "creating order"
        );
        let ack = match self.orders.submit(&draft, self.config.order_route).await {
            Ok(ack) => ack,
            Err(e) => return self.fail(e),
        };
        let Some(order_id) = ack.assigned_id().cloned() else {
            return self.fail(CommerceError::MissingOrderId);
        };
        tracing::info!(%order_id, "order created");

        match method {
            PaymentMethod::Card => self.start_card_payment(customer, &draft, order_id, amount).await,
            PaymentMethod::BankTransfer => {
                self.cart.clear();
                let instructions = self.config.bank_transfer.clone();
                self.set_state(CheckoutState::BankTransferPending {
                    order_id: order_id.clone(),
                    amount,
                    instructions: instructions.clone(),
                });
                Ok(CheckoutOutcome::BankTransferPending {
                    order_id,
                    amount,
                    instructions,
                })
            }
        }
    }

    async fn start_card_payment(
        &self,
        customer: &Customer,
        draft: &DraftOrder,
        order_id: OrderId,
        amount: Money,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let session = PaymentSession::new(order_id.clone(), amount, customer.reference());
        if let Err(e) = self.ledger.record(&session) {
            return self.fail(e.into());
        }
        self.set_state(CheckoutState::AwaitingGatewayResult {
            session: session.clone(),
        });

        let request = GatewayRequest {
            amount: amount.amount,
            order_id: order_id.to_string(),
            order_name: draft.order_name(),
            customer_name: customer.display_name().to_string(),
            customer_email: customer.email.clone(),
            success_url: self.config.success_url.clone(),
            fail_url: self.config.fail_url.clone(),
        };

        match self.widget.request_payment(&request).await {
            Ok(()) => {
                tracing::info!(%order_id, amount = amount.amount, "handed off to payment gateway");
                Ok(CheckoutOutcome::AwaitingGateway { order_id, amount })
            }
            Err(e) => {
                if let Err(err) = self.ledger.remove(&order_id) {
                    tracing::warn!(%order_id, error = %err, "failed to drop payment session");
                }
                self.fail(widget_error(e))
            }
        }
    }
}

fn widget_error(e: WidgetError) -> CommerceError {
    let message = match e.code.as_deref().map(GatewayErrorCode::parse) {
        Some(code) if code.is_known() => code.user_message().to_string(),
        _ if !e.message.trim().is_empty() => e.message.clone(),
        _ => GENERIC_PAYMENT_ERROR.to_string(),
    };
    CommerceError::Widget {
        code: e.code,
        message,
    }
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::checkout::OrderRoute;
    use crate::ids::UserId;
    use async_trait::async_trait;
    use serde_json::json;
    use shop_cache::{Cache, MemoryStore};
    use shop_data::mock::MockGateway;
    use shop_data::{ApiClient, Method};

    #[derive(Default)]
    struct RecordingWidget {
        calls: Mutex<Vec<GatewayRequest>>,
        error: Option<WidgetError>,
    }

    impl RecordingWidget {
        fn failing(code: &str, message: &str) -> Self {
            Self {
                calls: Mutex::default(),
                error: Some(WidgetError::new(Some(code), message)),
            }
        }

        fn calls(&self) -> Vec<GatewayRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentWidget for RecordingWidget {
        async fn request_payment(&self, request: &GatewayRequest) -> Result<(), WidgetError> {
            self.calls.lock().unwrap().push(request.clone());
            match &self.error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    struct Fixture {
        mock: MockGateway,
        cart: CartStore,
        ledger: PaymentSessionLedger,
        widget: Arc<RecordingWidget>,
        checkout: CheckoutOrchestrator,
    }

    fn fixture_with(widget: RecordingWidget, config: CheckoutConfig) -> Fixture {
        let mock = MockGateway::new();
        let cache = Cache::new(MemoryStore::new());
        let cart = CartStore::open(cache.clone());
        let ledger = PaymentSessionLedger::new(cache);
        let widget = Arc::new(widget);
        let checkout = CheckoutOrchestrator::new(
            cart.clone(),
            OrderApi::new(ApiClient::new(mock.clone())),
            ledger.clone(),
            widget.clone(),
            config,
        );
        cart.add_item(&Product::new("1", "Keyboard", 10000));
        cart.add_item(&Product::new("2", "Mouse", 5000));
        Fixture {
            mock,
            cart,
            ledger,
            widget,
            checkout,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingWidget::default(), CheckoutConfig::default())
    }

    fn customer() -> Customer {
        Customer::new(UserId::from(5))
            .with_name("Kim")
            .with_email("kim@example.com")
    }

    fn address() -> ShippingAddress {
        ShippingAddress::new("Kim", "010-1234-5678", "1 Main St")
    }

    #[tokio::test]
    async fn test_card_checkout_hands_off_after_order_creation() {
        let f = fixture();
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"id": 77}));

        let outcome = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap();

        assert_eq!(outcome.order_id().as_str(), "77");
        let calls = f.widget.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].order_id, "77");
        assert_eq!(calls[0].amount, 15000);
        assert_eq!(calls[0].order_name, "Keyboard and 1 more");
        assert_eq!(calls[0].customer_email.as_deref(), Some("kim@example.com"));

        let session = f.ledger.get(&OrderId::new("77")).unwrap().unwrap();
        assert_eq!(session.amount.amount, 15000);
        assert_eq!(session.customer_ref, "5");
        assert!(matches!(
            f.checkout.state(),
            CheckoutState::AwaitingGatewayResult { .. }
        ));
        // Card payments keep the cart until the payment is confirmed.
        assert_eq!(f.cart.total_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_address_makes_no_request() {
        let f = fixture();
        let err = f
            .checkout
            .submit(
                &customer(),
                ShippingAddress::new("Kim", "010", ""),
                PaymentMethod::Card,
            )
            .await
            .unwrap_err();

        assert_eq!(err, CommerceError::InvalidAddress(vec!["address"]));
        assert!(f.mock.requests().is_empty());
        assert!(f.widget.calls().is_empty());
        assert_eq!(
            f.checkout.state().error(),
            Some("Missing required shipping fields: address")
        );
    }

    #[tokio::test]
    async fn test_backend_rejection_keeps_cart_and_skips_widget() {
        let f = fixture();
        f.mock.respond(
            Method::Post,
            "/api/orders",
            409,
            json!({"code": "OUT_OF_STOCK", "message": "Mouse is out of stock"}),
        );

        let err = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Mouse is out of stock");
        assert!(f.widget.calls().is_empty());
        assert_eq!(f.cart.total_count(), 2);
        assert_eq!(f.checkout.state().error(), Some("Mouse is out of stock"));
    }

    #[tokio::test]
    async fn test_missing_order_id_never_starts_payment() {
        let f = fixture();
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"status": "PENDING"}));

        let err = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err, CommerceError::MissingOrderId);
        assert!(f.widget.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bank_transfer_clears_cart() {
        let f = fixture();
        f.mock.respond(
            Method::Post,
            "/api/orders",
            201,
            json!({"id": 90, "status": "PENDING_PAYMENT"}),
        );

        let outcome = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::BankTransfer)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::BankTransferPending { .. }));
        assert!(f.cart.is_empty());
        assert!(f.widget.calls().is_empty());
        let sent = f.mock.requests_to(Method::Post, "/api/orders");
        assert_eq!(sent[0].body.as_ref().unwrap()["paymentMethod"], "BANK_TRANSFER");
    }

    #[tokio::test]
    async fn test_double_submit_is_refused() {
        let f = fixture();
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"id": 77}));

        f.checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap();
        let err = f
            .checkout
            .clone()
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err, CommerceError::CheckoutInProgress);
        assert_eq!(f.mock.request_count(Method::Post, "/api/orders"), 1);

        f.checkout.reset();
        assert_eq!(f.checkout.state(), CheckoutState::default());
    }

    #[tokio::test]
    async fn test_abandon_frees_checkout_for_a_new_submission() {
        let f = fixture();
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"id": 77}));
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"id": 78}));

        f.checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap();
        f.checkout.abandon(&CommerceError::AmountMismatch {
            expected: 15000,
            received: 12000,
        });
        assert!(!f.checkout.state().is_in_flight());
        assert!(f.checkout.state().error().is_some());

        let outcome = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap();
        assert_eq!(outcome.order_id().as_str(), "78");
        assert_eq!(f.cart.total_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_submits_issue_one_order() {
        let f = fixture();
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"id": 77}));

        let c = customer();
        let (a, b) = futures::join!(
            f.checkout.submit(&c, address(), PaymentMethod::Card),
            f.checkout.submit(&c, address(), PaymentMethod::Card),
        );

        assert!(a.is_ok() != b.is_ok());
        assert_eq!(f.mock.request_count(Method::Post, "/api/orders"), 1);
    }

    #[tokio::test]
    async fn test_widget_cancel_returns_to_idle() {
        let f = fixture_with(
            RecordingWidget::failing("USER_CANCEL", "closed"),
            CheckoutConfig::default(),
        );
        f.mock.respond(Method::Post, "/api/orders", 201, json!({"id": 77}));

        let err = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "The payment was cancelled.");
        assert_eq!(f.checkout.state().error(), Some("The payment was cancelled."));
        assert!(f.ledger.get(&OrderId::new("77")).unwrap().is_none());
        assert_eq!(f.cart.total_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let f = fixture();
        f.cart.clear();
        let err = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap_err();
        assert_eq!(err, CommerceError::EmptyCart);
        assert!(f.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_payment_prepare_route() {
        let config = CheckoutConfig {
            order_route: OrderRoute::PaymentPrepare,
            ..CheckoutConfig::default()
        };
        let f = fixture_with(RecordingWidget::default(), config);
        f.mock.respond(
            Method::Post,
            "/api/payments/prepare",
            200,
            json!({"orderId": "ORD-1"}),
        );

        let outcome = f
            .checkout
            .submit(&customer(), address(), PaymentMethod::Card)
            .await
            .unwrap();
        assert_eq!(outcome.order_id().as_str(), "ORD-1");
        assert_eq!(f.mock.request_count(Method::Post, "/api/orders"), 0);
    }
}
