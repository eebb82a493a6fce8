//! Hosted-checkout payment widget.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Url;
use shop_commerce::payment::{GatewayRequest, PaymentWidget, WidgetError};

use crate::ConfigError;

type Launcher = dyn Fn(&Url) -> Result<(), WidgetError> + Send + Sync;

/// Hands the customer to the gateway's hosted checkout page.
///
/// The page URL carries the payment request as query parameters. What
/// "opening" it means is up to the launcher: a terminal prints it, a desktop
/// shell opens a browser. Without a launcher the URL is only logged and kept
/// for [`HostedCheckoutWidget::last_launch`].
#[derive(Clone)]
pub struct HostedCheckoutWidget {
    checkout_url: Url,
    client_key: Option<String>,
    launcher: Option<Arc<Launcher>>,
    last: Arc<Mutex<Option<Url>>>,
}

impl HostedCheckoutWidget {
    pub fn new(checkout_url: &str) -> Result<Self, ConfigError> {
        let checkout_url = Url::parse(checkout_url).map_err(|e| ConfigError::Invalid {
            field: "payment.checkout_url",
            message: e.to_string(),
        })?;
        Ok(Self {
            checkout_url,
            client_key: None,
            launcher: None,
            last: Arc::new(Mutex::new(None)),
        })
    }

    pub fn with_client_key(mut self, key: Option<String>) -> Self {
        self.client_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Called with the checkout URL each time a payment starts. An error
    /// aborts the checkout with that message.
    pub fn with_launcher(
        mut self,
        launcher: impl Fn(&Url) -> Result<(), WidgetError> + Send + Sync + 'static,
    ) -> Self {
        self.launcher = Some(Arc::new(launcher));
        self
    }

    /// The hosted page URL for `request`.
    pub fn url_for(&self, request: &GatewayRequest) -> Url {
        let mut url = self.checkout_url.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.client_key {
                query.append_pair("clientKey", key);
            }
            for (name, value) in request.query_pairs() {
                query.append_pair(name, &value);
            }
        }
        url
    }

    /// The URL of the most recent launch.
    pub fn last_launch(&self) -> Option<Url> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl PaymentWidget for HostedCheckoutWidget {
    async fn request_payment(&self, request: &GatewayRequest) -> Result<(), WidgetError> {
        let url = self.url_for(request);
        tracing::info!(order_id = %request.order_id, amount = request.amount, "opening hosted checkout");
        if let Some(launch) = &self.launcher {
            launch(&url)?;
        }
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(url);
        Ok(())
    }
}

impl fmt::Debug for HostedCheckoutWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedCheckoutWidget")
            .field("checkout_url", &self.checkout_url.as_str())
            .field("has_launcher", &self.launcher.is_some())
            .finish_non_exhaustive()
    }
}
