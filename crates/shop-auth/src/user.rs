//! User types and account forms.

use serde::{Deserialize, Serialize};
use shop_commerce::checkout::Customer;
use shop_commerce::ids::UserId;
use std::convert::Infallible;
use std::str::FromStr;

use crate::AuthError;

/// Minimum password length accepted by the signup forms.
pub const MIN_PASSWORD_LEN: usize = 8;

/// User role for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,
    /// Store administrator.
    Admin,
    /// A role this client does not know about.
    Other(String),
}

impl Role {
    /// Get role as the backend spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Other(s) => s,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "USER" | "ROLE_USER" | "" => Role::User,
            "ADMIN" | "ROLE_ADMIN" => Role::Admin,
            _ => Role::Other(s.to_string()),
        })
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// A user as the backend describes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    /// Get display name.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.email.as_str())
    }
}

/// The signed-in user.
///
/// `provisional` is set while the identity comes only from token claims and
/// has not yet been refreshed from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub provisional: bool,
}

impl CurrentUser {
    pub fn provisional(user: User) -> Self {
        Self {
            user,
            provisional: true,
        }
    }

    pub fn confirmed(user: User) -> Self {
        Self {
            user,
            provisional: false,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// Payer details used by checkout.
    pub fn customer(&self) -> Customer {
        let mut customer = Customer::new(self.user.id.clone());
        if let Some(name) = self.user.name.as_deref().filter(|n| !n.trim().is_empty()) {
            customer = customer.with_name(name);
        }
        if !self.user.email.is_empty() {
            customer = customer.with_email(self.user.email.clone());
        }
        customer
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "token")]
    pub access_token: String,
}

/// Customer signup form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
    pub phone: Option<String>,
}

/// Signup body as the backend expects it. The confirmation never leaves the
/// client.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_code: Option<String>,
}

impl SignUpForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirm: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            password_confirm: password_confirm.into(),
            name: name.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Check the form locally before anything is sent.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required.".into()));
        }
        if self.name.trim().is_empty() {
            return Err(AuthError::Validation("Name is required.".into()));
        }
        if self.password != self.password_confirm {
            return Err(AuthError::Validation("Passwords do not match.".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }

    /// Validate and build the request body.
    pub fn into_request(self) -> Result<SignUpRequest, AuthError> {
        self.validate()?;
        Ok(SignUpRequest {
            email: self.email.trim().to_string(),
            password: self.password,
            name: self.name.trim().to_string(),
            phone: self.phone.filter(|p| !p.trim().is_empty()),
            admin_code: None,
        })
    }
}

/// Administrator signup form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminSignUpForm {
    pub form: SignUpForm,
    pub admin_code: String,
}

impl AdminSignUpForm {
    pub fn new(form: SignUpForm, admin_code: impl Into<String>) -> Self {
        Self {
            form,
            admin_code: admin_code.into(),
        }
    }

    pub fn into_request(self) -> Result<SignUpRequest, AuthError> {
        if self.admin_code.trim().is_empty() {
            return Err(AuthError::Validation("Admin code is required.".into()));
        }
        let mut request = self.form.into_request()?;
        request.admin_code = Some(self.admin_code);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!("ROLE_ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!(
            "SELLER".parse::<Role>().unwrap(),
            Role::Other("SELLER".into())
        );
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_user_from_backend_json() {
        let user: User = serde_json::from_value(json!({
            "id": 5,
            "email": "kim@example.com",
            "name": "Kim",
            "role": "ADMIN",
            "createdAt": "2024-03-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(user.id, UserId::new("5"));
        assert!(user.role.is_admin());
        assert_eq!(user.display_name(), "Kim");
    }

    #[test]
    fn test_current_user_roundtrips_with_flag() {
        let current = CurrentUser::provisional(User {
            id: UserId::new("5"),
            email: "kim@example.com".into(),
            name: None,
            phone: None,
            role: Role::User,
            created_at: None,
        });
        let value = serde_json::to_value(&current).unwrap();
        assert_eq!(value["provisional"], true);
        assert_eq!(value["id"], 5);
        let back: CurrentUser = serde_json::from_value(value).unwrap();
        assert_eq!(back, current);
    }

    #[test]
    fn test_customer_from_current_user() {
        let current = CurrentUser::confirmed(User {
            id: UserId::new("5"),
            email: "kim@example.com".into(),
            name: Some("Kim".into()),
            phone: None,
            role: Role::User,
            created_at: None,
        });
        let customer = current.customer();
        assert_eq!(customer.user_id, UserId::new("5"));
        assert_eq!(customer.display_name(), "Kim");
    }

    #[test]
    fn test_signup_password_mismatch() {
        let form = SignUpForm::new("a@b.c", "password1", "password2", "Kim");
        assert_eq!(
            form.validate(),
            Err(AuthError::Validation("Passwords do not match.".into()))
        );
    }

    #[test]
    fn test_signup_short_password() {
        let form = SignUpForm::new("a@b.c", "short", "short", "Kim");
        assert!(matches!(form.validate(), Err(AuthError::Validation(_))));
    }

    #[test]
    fn test_signup_request_drops_confirmation() {
        let request = SignUpForm::new("a@b.c", "password1", "password1", "Kim")
            .into_request()
            .unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"email": "a@b.c", "password": "password1", "name": "Kim"})
        );
    }

    #[test]
    fn test_admin_signup_adds_code() {
        let form = SignUpForm::new("a@b.c", "password1", "password1", "Kim").with_phone("010");
        let request = AdminSignUpForm::new(form, "SECRET").into_request().unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["adminCode"], "SECRET");
        assert_eq!(value["phone"], "010");
    }
}
