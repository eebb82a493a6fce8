//! The signed-in session: token, identity and their persisted copy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use shop_cache::Cache;
use shop_commerce::checkout::Customer;
use shop_commerce::payment::PaymentSessionLedger;
use shop_commerce::CartStore;
use shop_data::ApiClient;

use crate::claims::TokenClaims;
use crate::user::{AdminSignUpForm, CurrentUser, LoginRequest, LoginResponse, SignUpForm, User};
use crate::AuthError;

/// Storage key for the persisted session.
pub const USER_STORAGE_KEY: &str = "user-storage";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    current_user: Option<CurrentUser>,
}

/// Owns the access token and the current user.
///
/// The token is mirrored onto the shared [`ApiClient`] so every backend call
/// is authenticated. Logging out also wipes the cart and any pending payment
/// sessions, since both belong to the signed-in shopper.
///
/// Clones share the same session.
#[derive(Clone, Debug)]
pub struct SessionStore {
    client: ApiClient,
    cache: Cache,
    cart: CartStore,
    ledger: PaymentSessionLedger,
    state: Arc<Mutex<PersistedSession>>,
}

impl SessionStore {
    /// Create a signed-out session. Call [`SessionStore::restore`] to pick up
    /// a persisted login.
    pub fn new(client: ApiClient, cache: Cache, cart: CartStore, ledger: PaymentSessionLedger) -> Self {
        Self {
            client,
            cache,
            cart,
            ledger,
            state: Arc::new(Mutex::new(PersistedSession::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PersistedSession> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &PersistedSession) {
        if let Err(e) = self.cache.set(USER_STORAGE_KEY, state) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    /// Reload a persisted login.
    ///
    /// An unreadable entry, an undecodable token or an expired one is
    /// discarded and the session stays signed out. A live token is installed
    /// and the user refreshed from the backend; if that refresh fails the
    /// stored identity is kept.
    pub async fn restore(&self) -> Option<CurrentUser> {
        let stored = match self.cache.get::<PersistedSession>(USER_STORAGE_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session");
                self.discard();
                return None;
            }
        };
        let token = stored.token.clone().filter(|t| !t.is_empty())?;

        let claims = match TokenClaims::decode(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "discarding stored token");
                self.discard();
                return None;
            }
        };
        if claims.is_expired_at(Utc::now()) {
            tracing::info!("stored session expired");
            self.discard();
            return None;
        }

        let user = match stored
            .current_user
            .filter(|u| Some(u.id()) == claims.resolved_user_id().as_ref())
        {
            Some(user) => user,
            None => match claims.provisional_user(None) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding stored token");
                    self.discard();
                    return None;
                }
            },
        };

        self.install(token.clone(), user.clone());
        Some(self.refresh(&token, user).await)
    }

    /// Log in with email and password.
    ///
    /// The returned user may be provisional if the profile lookup failed.
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.client.post("/api/users/login", &body).await?;
        let claims = TokenClaims::decode(&response.access_token)?;
        let user = claims.provisional_user(None)?;

        self.install(response.access_token.clone(), user.clone());
        tracing::info!(user_id = %user.id(), "logged in");
        Ok(self.refresh(&response.access_token, user).await)
    }

    /// Register a customer account. Does not log in.
    pub async fn sign_up(&self, form: SignUpForm) -> Result<(), AuthError> {
        let request = form.into_request()?;
        let _: IgnoredAny = self.client.post("/api/users/signup", &request).await?;
        tracing::info!("account created");
        Ok(())
    }

    /// Register an administrator account. Does not log in.
    pub async fn admin_sign_up(&self, form: AdminSignUpForm) -> Result<(), AuthError> {
        let request = form.into_request()?;
        let _: IgnoredAny = self.client.post("/api/users/admin/signup", &request).await?;
        tracing::info!("admin account created");
        Ok(())
    }

    /// Sign out.
    ///
    /// Always succeeds: the token, the persisted session, the cart and every
    /// pending payment session are cleared. Storage failures are logged.
    pub fn logout(&self) {
        self.discard();
        self.cart.clear();
        match self.ledger.clear_all() {
            Ok(n) if n > 0 => tracing::debug!(sessions = n, "cleared payment sessions"),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to clear payment sessions"),
        }
        tracing::info!("logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.lock().current_user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|u| u.is_admin())
    }

    /// Checkout payer for the signed-in user.
    pub fn customer(&self) -> Option<Customer> {
        self.current_user().map(|u| u.customer())
    }

    fn install(&self, token: String, user: CurrentUser) {
        let mut state = self.lock();
        *state = PersistedSession {
            is_authenticated: true,
            token: Some(token.clone()),
            current_user: Some(user),
        };
        self.client.set_bearer_token(Some(token));
        self.persist(&state);
    }

    fn discard(&self) {
        let mut state = self.lock();
        *state = PersistedSession::default();
        self.client.set_bearer_token(None);
        if let Err(e) = self.cache.delete(USER_STORAGE_KEY) {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
    }

    /// Replace a provisional identity with the backend's profile.
    ///
    /// The result is dropped if the session changed while the lookup was in
    /// flight (logout or another login).
    async fn refresh(&self, token: &str, user: CurrentUser) -> CurrentUser {
        let path = format!("/api/users/{}", user.id());
        let fresh = match self.client.get::<User>(&path).await {
            Ok(fresh) => CurrentUser::confirmed(fresh),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user.id(), "profile lookup failed, keeping token identity");
                return user;
            }
        };

        let mut state = self.lock();
        if state.token.as_deref() != Some(token) {
            tracing::debug!("session changed during profile lookup");
            return user;
        }
        state.current_user = Some(fresh.clone());
        self.persist(&state);
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::encode_for_test;
    use serde_json::json;
    use shop_cache::MemoryStore;
    use shop_commerce::catalog::Product;
    use shop_commerce::ids::{OrderId, UserId};
    use shop_commerce::money::{Currency, Money};
    use shop_commerce::payment::PaymentSession;
    use shop_data::mock::MockGateway;
    use shop_data::Method;

    fn live_token(user_id: i64) -> String {
        encode_for_test(&json!({
            "sub": "kim@example.com",
            "userId": user_id,
            "exp": Utc::now().timestamp() + 3600
        }))
    }

    fn setup() -> (MockGateway, Cache, SessionStore) {
        let gateway = MockGateway::default();
        let cache = Cache::new(MemoryStore::new());
        let client = ApiClient::new(gateway.clone());
        let session = SessionStore::new(
            client,
            cache.clone(),
            CartStore::open(cache.clone()),
            PaymentSessionLedger::new(cache.clone()),
        );
        (gateway, cache, session)
    }

    #[tokio::test]
    async fn test_login_refines_user() {
        let (gateway, cache, session) = setup();
        gateway.respond(Method::Post, "/api/users/login", 200, json!({"accessToken": live_token(5)}));
        gateway.respond(
            Method::Get,
            "/api/users/5",
            200,
            json!({"id": 5, "email": "kim@example.com", "name": "Kim", "role": "ADMIN"}),
        );

        let user = session.login("kim@example.com", "password1").await.unwrap();
        assert!(!user.provisional);
        assert_eq!(user.user.name.as_deref(), Some("Kim"));
        assert!(session.is_admin());
        assert!(session.is_authenticated());

        let profile = gateway.requests_to(Method::Get, "/api/users/5");
        assert_eq!(
            profile[0].header("Authorization"),
            session.token().map(|t| format!("Bearer {}", t))
        );

        let stored: PersistedSession = cache.get(USER_STORAGE_KEY).unwrap().unwrap();
        assert!(stored.is_authenticated);
        assert_eq!(stored.current_user, Some(user));
    }

    #[tokio::test]
    async fn test_login_keeps_provisional_user_when_lookup_fails() {
        let (gateway, _, session) = setup();
        gateway.respond(Method::Post, "/api/users/login", 200, json!({"accessToken": live_token(5)}));
        gateway.respond(Method::Get, "/api/users/5", 500, json!({"message": "down"}));

        let user = session.login("kim@example.com", "password1").await.unwrap();
        assert!(user.provisional);
        assert_eq!(user.user.name.as_deref(), Some("kim"));
        assert_eq!(session.customer().unwrap().user_id, UserId::new("5"));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let (gateway, _, session) = setup();
        gateway.respond(
            Method::Post,
            "/api/users/login",
            401,
            json!({"message": "Invalid email or password"}),
        );
        let err = session.login("kim@example.com", "nope").await.unwrap_err();
        assert!(err.is_auth_failure());
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_discards_expired_token() {
        let (gateway, cache, session) = setup();
        let expired = encode_for_test(&json!({"sub": "5", "exp": Utc::now().timestamp() - 10}));
        cache
            .set(
                USER_STORAGE_KEY,
                &json!({"isAuthenticated": true, "token": expired, "currentUser": null}),
            )
            .unwrap();

        assert!(session.restore().await.is_none());
        assert!(!session.is_authenticated());
        assert!(!cache.exists(USER_STORAGE_KEY).unwrap());
        assert_eq!(gateway.requests().len(), 0);
    }

    #[tokio::test]
    async fn test_restore_live_token() {
        let (gateway, cache, session) = setup();
        cache
            .set(
                USER_STORAGE_KEY,
                &json!({"isAuthenticated": true, "token": live_token(5), "currentUser": null}),
            )
            .unwrap();
        gateway.respond(Method::Get, "/api/users/5", 200, json!({"id": 5, "email": "kim@example.com"}));

        let user = session.restore().await.unwrap();
        assert!(!user.provisional);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let (gateway, cache, session) = setup();
        gateway.respond(Method::Post, "/api/users/login", 200, json!({"accessToken": live_token(5)}));
        session.login("kim@example.com", "password1").await.unwrap();

        let cart = CartStore::open(cache.clone());
        cart.add_item(&Product::new(1, "Mug", 15000));
        let ledger = PaymentSessionLedger::new(cache.clone());
        ledger
            .record(&PaymentSession::new(OrderId::new("77"), Money::new(15000, Currency::KRW), "5"))
            .unwrap();

        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(!cache.exists(USER_STORAGE_KEY).unwrap());
        assert!(ledger.get(&OrderId::new("77")).unwrap().is_none());
        assert!(CartStore::open(cache).is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_validates_locally() {
        let (gateway, _, session) = setup();
        let err = session
            .sign_up(SignUpForm::new("a@b.c", "password1", "password2", "Kim"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(gateway.requests().len(), 0);
    }

    #[tokio::test]
    async fn test_admin_sign_up_posts_code() {
        let (gateway, _, session) = setup();
        gateway.respond(Method::Post, "/api/users/admin/signup", 201, json!({"id": 9}));
        let form = SignUpForm::new("a@b.c", "password1", "password1", "Kim");
        session
            .admin_sign_up(AdminSignUpForm::new(form, "SECRET"))
            .await
            .unwrap();
        let sent = gateway.requests_to(Method::Post, "/api/users/admin/signup");
        let body = sent[0].body.clone().unwrap();
        assert_eq!(body["adminCode"], "SECRET");
        assert!(body.get("passwordConfirm").is_none());
    }
}
