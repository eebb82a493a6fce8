//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's smallest unit, so totals never
//! pick up floating-point drift. Multiplication saturates instead of
//! overflowing.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    KRW,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "KRW").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::KRW => "KRW",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::KRW => "\u{20a9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::KRW | Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "KRW" => Some(Currency::KRW),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Multiply by a quantity, clamping at the representable range.
    pub fn saturating_multiply(&self, quantity: u32) -> Money {
        Money::new(
            self.amount.saturating_mul(i64::from(quantity)),
            self.currency,
        )
    }

    /// Format as a display string (e.g., "₩15,000" or "$49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format the amount with thousands separators and no symbol.
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        let divisor = 10_u64.pow(places);
        let abs = self.amount.unsigned_abs();
        let whole = group_thousands(abs / divisor);
        let sign = if self.amount < 0 { "-" } else { "" };
        if places == 0 {
            format!("{sign}{whole}")
        } else {
            let frac = abs % divisor;
            format!("{sign}{whole}.{frac:0width$}", width = places as usize)
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse a whole, unsigned minor-unit amount.
///
/// Accepts `15000`, `15000.0` and `15000.00`; rejects fractional values,
/// any sign, and anything non-numeric.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (whole, frac) = match raw.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (raw, None),
    };
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b == b'0') {
            return None;
        }
    }
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    whole.parse().ok()
}

/// Serde helper for backend amounts sent as integers, floats or strings.
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match RawAmount::deserialize(deserializer)? {
        RawAmount::Int(n) => Ok(n),
        RawAmount::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        RawAmount::Float(f) => Err(serde::de::Error::custom(format!(
            "amount {f} is not a whole number"
        ))),
        RawAmount::Text(s) => parse_amount(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid amount: {s}"))),
    }
}

/// Like [`deserialize_amount`], rejecting negative values. Used for prices.
pub(crate) fn deserialize_price<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = deserialize_amount(deserializer)?;
    if amount < 0 {
        return Err(serde::de::Error::custom(format!(
            "price {amount} is negative"
        )));
    }
    Ok(amount)
}

/// Like [`deserialize_amount`], for optional fields.
pub(crate) fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_amount")] i64);

    Option::<Wrapper>::deserialize(deserializer).map(|w| w.map(|Wrapper(n)| n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(15000, Currency::KRW).display(), "\u{20a9}15,000");
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(123456789, Currency::USD).display(), "$1,234,567.89");
        assert_eq!(Money::new(-500, Currency::KRW).display_amount(), "-500");
        assert_eq!(Money::new(0, Currency::KRW).display_amount(), "0");
    }

    #[test]
    fn test_money_multiply() {
        let m = Money::new(1000, Currency::KRW);
        assert_eq!(m.saturating_multiply(3).amount, 3000);
        assert_eq!(
            Money::new(i64::MAX, Currency::KRW).saturating_multiply(2).amount,
            i64::MAX
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("15000"), Some(15000));
        assert_eq!(parse_amount(" 15000.0 "), Some(15000));
        assert_eq!(parse_amount("15000.00"), Some(15000));
        assert_eq!(parse_amount("15000.5"), None);
        assert_eq!(parse_amount("15000."), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("+5"), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("-15000"), None);
    }

    #[test]
    fn test_deserialize_amount_variants() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "deserialize_amount")]
            price: i64,
            #[serde(default, deserialize_with = "deserialize_optional_amount")]
            total: Option<i64>,
        }

        let row: Row = serde_json::from_str(r#"{"price": 15000.0, "total": "30000"}"#).unwrap();
        assert_eq!(row.price, 15000);
        assert_eq!(row.total, Some(30000));

        let row: Row = serde_json::from_str(r#"{"price": 1000}"#).unwrap();
        assert_eq!(row.total, None);

        assert!(serde_json::from_str::<Row>(r#"{"price": 10.5}"#).is_err());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("krw"), Some(Currency::KRW));
        assert_eq!(Currency::from_code("INVALID"), None);
        assert_eq!(Currency::default(), Currency::KRW);
    }
}
