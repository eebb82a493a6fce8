//! The application container.

use std::sync::Arc;

use shop_auth::SessionStore;
use shop_cache::{Cache, FileStore, KeyValueStore, MemoryStore};
use shop_commerce::api::{OrderApi, PaymentApi, ProductApi};
use shop_commerce::checkout::{
    CheckoutOrchestrator, CheckoutOutcome, Order, PaymentMethod, ShippingAddress,
};
use shop_commerce::payment::{
    parse_redirect_url, ConfirmationOutcome, FailCallback, PaymentFailure, PaymentSessionLedger,
    PaymentWidget, Reconciler, SuccessCallback,
};
use shop_commerce::{CartStore, CommerceError};
use shop_data::{ApiClient, FetchClient, HttpGateway};

use crate::config::StorefrontConfig;
use crate::widget::HostedCheckoutWidget;
use crate::SdkError;

/// What a gateway redirect turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum RedirectOutcome {
    /// Success redirect, payment confirmed (now or earlier).
    Confirmed(ConfirmationOutcome),
    /// Fail redirect.
    Failed(PaymentFailure),
}

/// Builder for [`Storefront`].
///
/// Unset parts default to the real implementations: a `reqwest` gateway on
/// `api.base_url`, a file store in `storage.dir` (memory if unset) and the
/// hosted checkout widget.
pub struct StorefrontBuilder {
    config: StorefrontConfig,
    gateway: Option<Arc<dyn HttpGateway>>,
    store: Option<Arc<dyn KeyValueStore>>,
    widget: Option<Arc<dyn PaymentWidget>>,
}

impl StorefrontBuilder {
    pub fn gateway(mut self, gateway: impl HttpGateway + 'static) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    pub fn store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn widget(mut self, widget: impl PaymentWidget + 'static) -> Self {
        self.widget = Some(Arc::new(widget));
        self
    }

    /// Wire everything without touching the network.
    ///
    /// The persisted cart is loaded; the persisted session is not (see
    /// [`StorefrontBuilder::open`]).
    pub fn build(self) -> Result<Storefront, SdkError> {
        let config = self.config;
        config.validate()?;

        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(
                FetchClient::new()
                    .with_base_url(config.api.base_url.clone())
                    .with_timeout(config.api.timeout()),
            ),
        };
        let store: Arc<dyn KeyValueStore> = match (self.store, &config.storage.dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileStore::open(dir)?),
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let widget = match self.widget {
            Some(widget) => widget,
            None => Arc::new(
                HostedCheckoutWidget::new(&config.payment.checkout_url)?
                    .with_client_key(config.payment.client_key.clone()),
            ),
        };

        let cache = Cache::from_shared(store);
        let client = ApiClient::from_shared(gateway);
        let cart = CartStore::open_with_currency(cache.clone(), config.payment.currency);
        let ledger = PaymentSessionLedger::new(cache.clone());
        let orders = OrderApi::new(client.clone());
        let payments = PaymentApi::new(client.clone());
        let products = ProductApi::new(client.clone());

        let session = SessionStore::new(client, cache, cart.clone(), ledger.clone());
        let checkout = CheckoutOrchestrator::new(
            cart.clone(),
            orders.clone(),
            ledger.clone(),
            widget,
            config.checkout_config(),
        );
        let reconciler = Reconciler::new(payments.clone(), cart.clone(), ledger);

        tracing::debug!(api = %config.api.base_url, "storefront ready");
        Ok(Storefront {
            config,
            cart,
            session,
            checkout,
            reconciler,
            orders,
            payments,
            products,
        })
    }

    /// Build and restore the persisted session.
    pub async fn open(self) -> Result<Storefront, SdkError> {
        let storefront = self.build()?;
        if let Some(user) = storefront.session.restore().await {
            tracing::info!(user_id = %user.id(), "session restored");
        }
        Ok(storefront)
    }
}

/// Owns every storefront service for one shopper.
///
/// Nothing is global: services share state only through the handles this
/// container gives them.
#[derive(Clone)]
pub struct Storefront {
    config: StorefrontConfig,
    cart: CartStore,
    session: SessionStore,
    checkout: CheckoutOrchestrator,
    reconciler: Reconciler,
    orders: OrderApi,
    payments: PaymentApi,
    products: ProductApi,
}

impl Storefront {
    pub fn builder(config: StorefrontConfig) -> StorefrontBuilder {
        StorefrontBuilder {
            config,
            gateway: None,
            store: None,
            widget: None,
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn orchestrator(&self) -> &CheckoutOrchestrator {
        &self.checkout
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn orders(&self) -> &OrderApi {
        &self.orders
    }

    pub fn payments(&self) -> &PaymentApi {
        &self.payments
    }

    pub fn products(&self) -> &ProductApi {
        &self.products
    }

    /// Check out the cart as the signed-in user.
    pub async fn checkout(
        &self,
        address: ShippingAddress,
        method: PaymentMethod,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let customer = self.session.customer().ok_or(CommerceError::NotAuthenticated)?;
        self.checkout.submit(&customer, address, method).await
    }

    /// Handle the gateway redirecting back to the success or fail URL.
    ///
    /// Works from the URL and persisted state alone, so it can run in a fresh
    /// process. The redirect is routed by comparing its path with the
    /// configured success and fail URLs. Checkout is back in `Idle` afterwards
    /// either way; a rejected redirect leaves its error there and keeps the cart.
    pub async fn handle_redirect(&self, raw: &str) -> Result<RedirectOutcome, CommerceError> {
        let result = self.route_redirect(raw).await;
        match &result {
            Ok(_) => self.checkout.reset(),
            Err(e) => self.checkout.abandon(e),
        }
        result
    }

    async fn route_redirect(&self, raw: &str) -> Result<RedirectOutcome, CommerceError> {
        let url = parse_redirect_url(raw)?;
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        if same_path(url.path(), &self.config.payment.success_url) {
            let callback = SuccessCallback::from_pairs(&pairs)?;
            Ok(RedirectOutcome::Confirmed(
                self.reconciler.confirm_payment(callback).await?,
            ))
        } else if same_path(url.path(), &self.config.payment.fail_url) {
            Ok(RedirectOutcome::Failed(
                self.reconciler.handle_failure(FailCallback::from_pairs(&pairs)),
            ))
        } else {
            Err(CommerceError::MalformedCallback(format!(
                "unrecognised redirect path: {}",
                url.path()
            )))
        }
    }

    /// Orders of the signed-in user.
    pub async fn order_history(&self) -> Result<Vec<Order>, CommerceError> {
        let user = self
            .session
            .current_user()
            .ok_or(CommerceError::NotAuthenticated)?;
        self.orders.list_for_user(user.id()).await
    }
}

fn same_path(path: &str, configured: &str) -> bool {
    parse_redirect_url(configured)
        .map(|url| url.path().trim_end_matches('/') == path.trim_end_matches('/'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_path_ignores_host_and_trailing_slash() {
        assert!(same_path("/payment/success", "http://localhost:3000/payment/success"));
        assert!(same_path("/payment/success/", "https://shop.example.com/payment/success"));
        assert!(!same_path("/payment/fail", "http://localhost:3000/payment/success"));
    }

    #[test]
    fn test_build_with_defaults() {
        let storefront = Storefront::builder(StorefrontConfig::default()).build().unwrap();
        assert!(storefront.cart().is_empty());
        assert!(!storefront.session().is_authenticated());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = StorefrontConfig::default();
        config.payment.success_url = "::".into();
        assert!(matches!(
            Storefront::builder(config).build(),
            Err(SdkError::Config(_))
        ));
    }
}
