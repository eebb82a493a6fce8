//! Finalizing a payment after the gateway redirects back.

use std::sync::Arc;

use futures::lock::Mutex;

use crate::api::{ConfirmPaymentRequest, Payment, PaymentApi};
use crate::cart::CartStore;
use crate::ids::OrderId;
use crate::money::Money;
use crate::payment::{
    FailCallback, GatewayErrorCode, PaymentSession, PaymentSessionLedger, SuccessCallback,
};
use crate::CommerceError;

/// Backend error codes meaning the payment was confirmed earlier.
const ALREADY_CONFIRMED_CODES: &[&str] = &["ALREADY_PROCESSED_PAYMENT", "ALREADY_CONFIRMED"];

/// Result of a confirmation attempt that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    /// The backend confirmed the payment just now.
    Confirmed {
        order_id: OrderId,
        amount: i64,
        payment: Payment,
    },
    /// The payment had been confirmed before (reload or back navigation).
    AlreadyProcessed { order_id: OrderId },
}

impl ConfirmationOutcome {
    pub fn order_id(&self) -> &OrderId {
        match self {
            ConfirmationOutcome::Confirmed { order_id, .. }
            | ConfirmationOutcome::AlreadyProcessed { order_id } => order_id,
        }
    }
}

/// What to show after a fail redirect.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailure {
    pub code: Option<GatewayErrorCode>,
    pub message: &'static str,
    pub detail: Option<String>,
    pub order_id: Option<OrderId>,
}

/// Handles the gateway's success and fail redirects.
///
/// Holds no checkout state: everything it needs comes from the redirect
/// parameters and the persisted payment ledger.
#[derive(Debug, Clone)]
pub struct Reconciler {
    payments: PaymentApi,
    cart: CartStore,
    ledger: PaymentSessionLedger,
    confirm_lock: Arc<Mutex<()>>,
}

impl Reconciler {
    pub fn new(payments: PaymentApi, cart: CartStore, ledger: PaymentSessionLedger) -> Self {
        Self {
            payments,
            cart,
            ledger,
            confirm_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Confirm a payment from the success redirect.
    ///
    /// Rejects without calling the backend when the amount differs from the
    /// one recorded at order creation. Otherwise calls the backend exactly
    /// once. The cart is cleared the first time an order is confirmed and
    /// left alone on any failure. A backend answer meaning "already
    /// confirmed" is reported as [`ConfirmationOutcome::AlreadyProcessed`].
    pub async fn confirm_payment(
        &self,
        callback: SuccessCallback,
    ) -> Result<ConfirmationOutcome, CommerceError> {
        let _guard = self.confirm_lock.lock().await;
        let SuccessCallback {
            payment_key,
            order_id,
            amount,
        } = callback;

        let session = self.recorded_session(&order_id);
        if let Some(session) = &session {
            if session.amount.amount != amount {
                tracing::warn!(
                    %order_id,
                    expected = session.amount.amount,
                    received = amount,
                    "payment amount mismatch"
                );
                return Err(CommerceError::AmountMismatch {
                    expected: session.amount.amount,
                    received: amount,
                });
            }
        }
        let previously_confirmed = session.as_ref().is_some_and(PaymentSession::is_confirmed);
        let currency = session
            .as_ref()
            .map(|s| s.amount.currency)
            .unwrap_or_else(|| self.cart.snapshot().currency);

        let request = ConfirmPaymentRequest::new(&payment_key, &order_id, amount);
        let outcome = match self.payments.confirm(&request).await {
            Ok(payment) if previously_confirmed => {
                tracing::info!(%order_id, payment = ?payment.id, "payment already confirmed locally");
                ConfirmationOutcome::AlreadyProcessed { order_id }
            }
            Ok(payment) => {
                tracing::info!(%order_id, amount, "payment confirmed");
                ConfirmationOutcome::Confirmed {
                    order_id,
                    amount,
                    payment,
                }
            }
            Err(CommerceError::BackendRejection { status, code, .. })
                if is_already_confirmed(status, code.as_deref()) =>
            {
                tracing::info!(%order_id, status, "backend reports payment already confirmed");
                ConfirmationOutcome::AlreadyProcessed { order_id }
            }
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "payment confirmation failed");
                return Err(e);
            }
        };

        if !previously_confirmed {
            self.cart.clear();
        }
        if let Err(e) = self
            .ledger
            .mark_confirmed(outcome.order_id(), Money::new(amount, currency))
        {
            tracing::warn!(order_id = %outcome.order_id(), error = %e, "failed to record confirmation");
        }
        Ok(outcome)
    }

    /// Handle the fail redirect. Purely informational: no backend call, the
    /// cart is kept so the customer can retry.
    pub fn handle_failure(&self, callback: FailCallback) -> PaymentFailure {
        let message = callback.user_message();
        tracing::info!(
            code = callback.code.as_ref().map(GatewayErrorCode::as_str),
            order_id = callback.order_id.as_ref().map(OrderId::as_str),
            "payment failed at gateway"
        );
        if let Some(order_id) = &callback.order_id {
            if let Err(e) = self.ledger.remove(order_id) {
                tracing::warn!(%order_id, error = %e, "failed to drop payment session");
            }
        }
        PaymentFailure {
            code: callback.code,
            message,
            detail: callback.message,
            order_id: callback.order_id,
        }
    }

    fn recorded_session(&self, order_id: &OrderId) -> Option<PaymentSession> {
        match self.ledger.get(order_id) {
            Ok(session) => {
                if session.is_none() {
                    tracing::debug!(%order_id, "no recorded payment session");
                }
                session
            }
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "unreadable payment session");
                None
            }
        }
    }
}

fn is_already_confirmed(status: u16, code: Option<&str>) -> bool {
    status == 409 || code.is_some_and(|c| ALREADY_CONFIRMED_CODES.contains(&c))
}
