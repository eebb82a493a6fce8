//! Gateway error codes carried on the fail redirect.

use std::fmt;

/// Shown for codes this client does not recognise.
pub const GENERIC_PAYMENT_ERROR: &str = "An error occurred while processing the payment.";

/// Error codes the payment gateway reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GatewayErrorCode {
    PayProcessCanceled,
    PayProcessAborted,
    UserCancel,
    RejectCardCompany,
    RejectCardPayment,
    InvalidCardExpiration,
    InvalidStoppedCard,
    InvalidCardLostOrStolen,
    ExceedMaxDailyPaymentCount,
    ExceedMaxPaymentAmount,
    BelowMinimumAmount,
    NotSupportedInstallmentPlan,
    RejectAccountPayment,
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl GatewayErrorCode {
    /// Parse a gateway code. Never fails; unrecognised codes become `Unknown`.
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "PAY_PROCESS_CANCELED" => GatewayErrorCode::PayProcessCanceled,
            "PAY_PROCESS_ABORTED" => GatewayErrorCode::PayProcessAborted,
            "USER_CANCEL" => GatewayErrorCode::UserCancel,
            "REJECT_CARD_COMPANY" => GatewayErrorCode::RejectCardCompany,
            "REJECT_CARD_PAYMENT" => GatewayErrorCode::RejectCardPayment,
            "INVALID_CARD_EXPIRATION" => GatewayErrorCode::InvalidCardExpiration,
            "INVALID_STOPPED_CARD" => GatewayErrorCode::InvalidStoppedCard,
            "INVALID_CARD_LOST_OR_STOLEN" => GatewayErrorCode::InvalidCardLostOrStolen,
            "EXCEED_MAX_DAILY_PAYMENT_COUNT" => GatewayErrorCode::ExceedMaxDailyPaymentCount,
            "EXCEED_MAX_PAYMENT_AMOUNT" => GatewayErrorCode::ExceedMaxPaymentAmount,
            "BELOW_MINIMUM_AMOUNT" => GatewayErrorCode::BelowMinimumAmount,
            "NOT_SUPPORTED_INSTALLMENT_PLAN_CARD_OR_MERCHANT" => {
                GatewayErrorCode::NotSupportedInstallmentPlan
            }
            "REJECT_ACCOUNT_PAYMENT" => GatewayErrorCode::RejectAccountPayment,
            other => GatewayErrorCode::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GatewayErrorCode::PayProcessCanceled => "PAY_PROCESS_CANCELED",
            GatewayErrorCode::PayProcessAborted => "PAY_PROCESS_ABORTED",
            GatewayErrorCode::UserCancel => "USER_CANCEL",
            GatewayErrorCode::RejectCardCompany => "REJECT_CARD_COMPANY",
            GatewayErrorCode::RejectCardPayment => "REJECT_CARD_PAYMENT",
            GatewayErrorCode::InvalidCardExpiration => "INVALID_CARD_EXPIRATION",
            GatewayErrorCode::InvalidStoppedCard => "INVALID_STOPPED_CARD",
            GatewayErrorCode::InvalidCardLostOrStolen => "INVALID_CARD_LOST_OR_STOLEN",
            GatewayErrorCode::ExceedMaxDailyPaymentCount => "EXCEED_MAX_DAILY_PAYMENT_COUNT",
            GatewayErrorCode::ExceedMaxPaymentAmount => "EXCEED_MAX_PAYMENT_AMOUNT",
            GatewayErrorCode::BelowMinimumAmount => "BELOW_MINIMUM_AMOUNT",
            GatewayErrorCode::NotSupportedInstallmentPlan => {
                "NOT_SUPPORTED_INSTALLMENT_PLAN_CARD_OR_MERCHANT"
            }
            GatewayErrorCode::RejectAccountPayment => "REJECT_ACCOUNT_PAYMENT",
            GatewayErrorCode::Unknown(code) => code,
        }
    }

    /// Message for the customer.
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayErrorCode::PayProcessCanceled | GatewayErrorCode::UserCancel => {
                "The payment was cancelled."
            }
            GatewayErrorCode::PayProcessAborted => "The payment was aborted. Please try again.",
            GatewayErrorCode::RejectCardCompany | GatewayErrorCode::RejectCardPayment => {
                "The card company declined the payment."
            }
            GatewayErrorCode::InvalidCardExpiration => "The card has expired.",
            GatewayErrorCode::InvalidStoppedCard => "The card has been suspended.",
            GatewayErrorCode::InvalidCardLostOrStolen => "The card was reported lost or stolen.",
            GatewayErrorCode::ExceedMaxDailyPaymentCount => {
                "The daily payment limit for this card has been reached."
            }
            GatewayErrorCode::ExceedMaxPaymentAmount => {
                "The amount exceeds the card's payment limit."
            }
            GatewayErrorCode::BelowMinimumAmount => "The amount is below the minimum payment.",
            GatewayErrorCode::NotSupportedInstallmentPlan => {
                "This card or merchant does not support the selected installment plan."
            }
            GatewayErrorCode::RejectAccountPayment => "The bank declined the account payment.",
            GatewayErrorCode::Unknown(_) => GENERIC_PAYMENT_ERROR,
        }
    }

    /// The customer backed out rather than being declined.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::PayProcessCanceled | GatewayErrorCode::UserCancel
        )
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, GatewayErrorCode::Unknown(_))
    }
}

impl fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
