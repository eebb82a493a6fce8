//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where an OrderId is expected.
//!
//! The backend hands out numeric ids while the payment gateway works with
//! strings, so every id deserializes from either a JSON string or a number.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Macro to generate newtype ID structs.
///
/// `numeric` ids serialize back as JSON numbers when the value is an integer,
/// matching the backend's `Long` identifiers.
macro_rules! define_id {
    ($name:ident, $doc:literal) => {
        define_id!(@base $name, $doc);

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }
    };
    ($name:ident, $doc:literal, numeric) => {
        define_id!(@base $name, $doc);

        impl $name {
            /// The id as an integer, when it is one.
            pub fn as_i64(&self) -> Option<i64> {
                self.0.parse().ok()
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.as_i64() {
                    Some(n) => serializer.serialize_i64(n),
                    None => serializer.serialize_str(&self.0),
                }
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                Self(n.to_string())
            }
        }
    };
    (@base $name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

define_id!(ProductId, "Catalog product identifier.", numeric);
define_id!(OrderId, "Backend-assigned order identifier.", numeric);
define_id!(UserId, "Backend user identifier.", numeric);
define_id!(PaymentId, "Backend payment record identifier.", numeric);
define_id!(PaymentKey, "Gateway-issued payment key returned on the success redirect.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_number_or_string() {
        let a: OrderId = serde_json::from_str("77").unwrap();
        let b: OrderId = serde_json::from_str("\"77\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "77");
    }

    #[test]
    fn test_numeric_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&UserId::from(5)).unwrap(), "5");
        assert_eq!(
            serde_json::to_string(&UserId::new("u-5")).unwrap(),
            "\"u-5\""
        );
    }

    #[test]
    fn test_payment_key_stays_a_string() {
        let key = PaymentKey::new("12345");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"12345\"");
    }

    #[test]
    fn test_id_display() {
        let id = ProductId::new("prod-789");
        assert_eq!(format!("{}", id), "prod-789");
        assert_eq!(id.as_i64(), None);
    }
}
