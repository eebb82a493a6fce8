//! Payment sessions recorded between order creation and the gateway redirect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_cache::{cache_key, Cache, CacheError};

use crate::ids::OrderId;
use crate::money::Money;

/// Cache key prefix for payment sessions.
pub const PAYMENT_SESSION_PREFIX: &str = "payment-session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Handed to the gateway, no confirmation yet.
    #[default]
    Pending,
    /// The backend confirmed the payment and the cart was cleared.
    Confirmed,
}

/// What was handed to the gateway for one order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub order_id: OrderId,
    pub amount: Money,
    pub customer_ref: String,
    #[serde(default)]
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl PaymentSession {
    pub fn new(order_id: OrderId, amount: Money, customer_ref: impl Into<String>) -> Self {
        Self {
            order_id,
            amount,
            customer_ref: customer_ref.into(),
            status: SessionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == SessionStatus::Confirmed
    }
}

/// Persisted payment sessions, one entry per order id.
#[derive(Debug, Clone)]
pub struct PaymentSessionLedger {
    cache: Cache,
}

impl PaymentSessionLedger {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    fn key(order_id: &OrderId) -> String {
        cache_key!(PAYMENT_SESSION_PREFIX, order_id)
    }

    /// Record (or replace) the session for its order.
    pub fn record(&self, session: &PaymentSession) -> Result<(), CacheError> {
        self.cache.set(&Self::key(&session.order_id), session)
    }

    pub fn get(&self, order_id: &OrderId) -> Result<Option<PaymentSession>, CacheError> {
        self.cache.get(&Self::key(order_id))
    }

    /// Mark the order's session confirmed, creating it if it was never recorded.
    pub fn mark_confirmed(&self, order_id: &OrderId, amount: Money) -> Result<(), CacheError> {
        let mut session = self
            .get(order_id)?
            .unwrap_or_else(|| PaymentSession::new(order_id.clone(), amount, String::new()));
        session.status = SessionStatus::Confirmed;
        self.record(&session)
    }

    pub fn remove(&self, order_id: &OrderId) -> Result<(), CacheError> {
        self.cache.delete(&Self::key(order_id))
    }

    /// Drop every recorded session. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize, CacheError> {
        let keys = self
            .cache
            .keys_with_prefix(&format!("{PAYMENT_SESSION_PREFIX}:"))?;
        for key in &keys {
            self.cache.delete(key)?;
        }
        Ok(keys.len())
    }
}
