//! JWT payload decoding.
//!
//! The client never verifies signatures; it only reads the claims to get a
//! provisional identity. The backend verifies every request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shop_commerce::ids::UserId;

use crate::user::{CurrentUser, Role, User};
use crate::AuthError;

/// Claims the storefront reads from an access token.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    /// Expiry as seconds since the epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of `token`.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let payload = token
            .split('.')
            .nth(1)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AuthError::InvalidToken("missing payload segment".into()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// The user id: `userId`, then `id`, then `sub`.
    pub fn resolved_user_id(&self) -> Option<UserId> {
        self.user_id
            .clone()
            .or_else(|| self.id.clone())
            .or_else(|| self.sub.as_deref().map(UserId::new))
            .filter(|id| !id.as_str().trim().is_empty())
    }

    /// Whether the token is unusable at `now`. Tokens without `exp` count as
    /// expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp <= now.timestamp(),
            None => true,
        }
    }

    /// Identity derived from the claims alone, to be refined from the backend.
    ///
    /// `fallback_name` is used when the token carries no name.
    pub fn provisional_user(&self, fallback_name: Option<&str>) -> Result<CurrentUser, AuthError> {
        let id = self
            .resolved_user_id()
            .ok_or_else(|| AuthError::InvalidToken("no user id claim".into()))?;
        let email = self.email.clone().or_else(|| self.sub.clone()).unwrap_or_default();
        let name = self
            .name
            .clone()
            .or_else(|| fallback_name.map(str::to_string))
            .or_else(|| email.split('@').next().filter(|s| !s.is_empty()).map(str::to_string));
        Ok(CurrentUser::provisional(User {
            id,
            email,
            name,
            phone: None,
            role: self.role.clone().unwrap_or_default(),
            created_at: None,
        }))
    }
}

#[cfg(test)]
pub(crate) fn encode_for_test(claims: &serde_json::Value) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
