//! Payment gateway handoff and reconciliation.
//!
//! Card checkouts leave the application: the [`PaymentWidget`] sends the
//! customer to the hosted gateway, which later redirects back to a success or
//! fail URL. The [`PaymentSessionLedger`] remembers what was handed over so the
//! [`Reconciler`] can check the redirect on the next load without any
//! in-memory checkout state.

mod callback;
mod codes;
mod reconcile;
mod session;
mod widget;

pub use callback::{parse_redirect_url, FailCallback, SuccessCallback};
pub use codes::{GatewayErrorCode, GENERIC_PAYMENT_ERROR};
pub use reconcile::{ConfirmationOutcome, PaymentFailure, Reconciler};
pub use session::{PaymentSession, PaymentSessionLedger, SessionStatus, PAYMENT_SESSION_PREFIX};
pub use widget::{GatewayRequest, PaymentWidget, WidgetError};
