//! Parameters carried by the gateway's success and fail redirects.

use reqwest::Url;

use crate::ids::{OrderId, PaymentKey};
use crate::money::parse_amount;
use crate::payment::GatewayErrorCode;
use crate::CommerceError;

/// Parse a redirect target: an absolute URL or a path like
/// `/payment/success?paymentKey=...`.
pub fn parse_redirect_url(raw: &str) -> Result<Url, CommerceError> {
    let raw = raw.trim();
    Url::parse(raw)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(raw)))
        .map_err(|e| CommerceError::MalformedCallback(format!("invalid redirect url: {e}")))
}

/// Query parameters from a URL, a path with a query, or a bare query string.
fn query_params(raw: &str) -> Result<Vec<(String, String)>, CommerceError> {
    let raw = raw.trim();
    let url = if raw.contains("://") || raw.starts_with('/') || raw.starts_with('?') {
        parse_redirect_url(raw)?
    } else {
        parse_redirect_url(&format!("/?{raw}"))?
    };
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

fn lookup<'a, K, V>(pairs: &'a [(K, V)], name: &str) -> Option<&'a str>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .find(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_ref().trim())
        .filter(|v| !v.is_empty())
}

/// The success redirect: `successUrl?paymentKey=...&orderId=...&amount=...`.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessCallback {
    pub payment_key: PaymentKey,
    pub order_id: OrderId,
    pub amount: i64,
}

impl SuccessCallback {
    /// Build from already-split parameters. The first occurrence of a name wins.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, CommerceError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let payment_key = lookup(pairs, "paymentKey")
            .ok_or_else(|| CommerceError::MalformedCallback("missing paymentKey".into()))?;
        let order_id = lookup(pairs, "orderId")
            .ok_or_else(|| CommerceError::MalformedCallback("missing orderId".into()))?;
        let raw_amount = lookup(pairs, "amount")
            .ok_or_else(|| CommerceError::MalformedCallback("missing amount".into()))?;
        let amount = parse_amount(raw_amount).ok_or_else(|| {
            CommerceError::MalformedCallback(format!("amount is not a whole non-negative number: {raw_amount}"))
        })?;

        Ok(Self {
            payment_key: PaymentKey::new(payment_key),
            order_id: OrderId::new(order_id),
            amount,
        })
    }

    /// Parse from a redirect URL or its query string.
    pub fn parse(raw: &str) -> Result<Self, CommerceError> {
        Self::from_pairs(&query_params(raw)?)
    }
}

/// The fail redirect: `failUrl?code=...&message=...`.
#[derive(Debug, Clone, PartialEq)]
pub struct FailCallback {
    pub code: Option<GatewayErrorCode>,
    /// The gateway's own description, shown as detail only.
    pub message: Option<String>,
    pub order_id: Option<OrderId>,
}

impl FailCallback {
    /// Build from already-split parameters. Every field is optional.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            code: lookup(pairs, "code").map(GatewayErrorCode::parse),
            message: lookup(pairs, "message").map(str::to_string),
            order_id: lookup(pairs, "orderId").map(OrderId::new),
        }
    }

    /// Parse from a redirect URL or its query string.
    pub fn parse(raw: &str) -> Result<Self, CommerceError> {
        Ok(Self::from_pairs(&query_params(raw)?))
    }

    /// Message for the customer: the known code's message, else a generic one.
    pub fn user_message(&self) -> &'static str {
        self.code
            .as_ref()
            .map(GatewayErrorCode::user_message)
            .unwrap_or(super::GENERIC_PAYMENT_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::GENERIC_PAYMENT_ERROR;

    #[test]
    fn test_success_from_full_url() {
        let cb = SuccessCallback::parse(
            "http://localhost:3000/payment/success?paymentKey=pk_1&orderId=77&amount=15000",
        )
        .unwrap();
        assert_eq!(cb.payment_key.as_str(), "pk_1");
        assert_eq!(cb.order_id.as_str(), "77");
        assert_eq!(cb.amount, 15000);
    }

    #[test]
    fn test_success_from_path_and_bare_query() {
        let a = SuccessCallback::parse("/payment/success?paymentKey=k&orderId=1&amount=10").unwrap();
        let b = SuccessCallback::parse("paymentKey=k&orderId=1&amount=10").unwrap();
        let c = SuccessCallback::parse("?paymentKey=k&orderId=1&amount=10").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_success_accepts_decimal_zero_amount() {
        let cb = SuccessCallback::parse("paymentKey=k&orderId=1&amount=15000.0").unwrap();
        assert_eq!(cb.amount, 15000);
    }

    #[test]
    fn test_success_decodes_percent_escapes() {
        let cb = SuccessCallback::parse("paymentKey=a%2Bb&orderId=ORD%201&amount=5").unwrap();
        assert_eq!(cb.payment_key.as_str(), "a+b");
        assert_eq!(cb.order_id.as_str(), "ORD 1");
    }

    #[test]
    fn test_missing_or_blank_parameters_are_malformed() {
        for query in [
            "orderId=1&amount=10",
            "paymentKey=k&amount=10",
            "paymentKey=k&orderId=1",
            "paymentKey=k&orderId=%20&amount=10",
            "paymentKey=k&orderId=1&amount=ten",
            "paymentKey=k&orderId=1&amount=10.5",
            "paymentKey=k&orderId=1&amount=-15000",
        ] {
            assert!(
                matches!(
                    SuccessCallback::parse(query),
                    Err(CommerceError::MalformedCallback(_))
                ),
                "{query} should be malformed"
            );
        }
    }

    #[test]
    fn test_from_pairs() {
        let pairs = [("paymentKey", "k"), ("orderId", "3"), ("amount", "99")];
        let cb = SuccessCallback::from_pairs(&pairs).unwrap();
        assert_eq!(cb.amount, 99);
    }

    #[test]
    fn test_fail_callback_messages() {
        let cb = FailCallback::parse("/payment/fail?code=PAY_PROCESS_CANCELED&message=closed").unwrap();
        assert_eq!(cb.code, Some(GatewayErrorCode::PayProcessCanceled));
        assert_eq!(cb.message.as_deref(), Some("closed"));
        assert_eq!(cb.user_message(), "The payment was cancelled.");

        let cb = FailCallback::parse("code=WHATEVER").unwrap();
        assert_eq!(cb.user_message(), GENERIC_PAYMENT_ERROR);

        let cb = FailCallback::parse("").unwrap();
        assert_eq!(cb.code, None);
        assert_eq!(cb.user_message(), GENERIC_PAYMENT_ERROR);
    }
}
