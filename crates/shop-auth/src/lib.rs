//! Session handling for the shopfront client.
//!
//! Decodes access-token claims, logs users in and out, registers accounts and
//! persists the signed-in session so it survives a restart.

mod claims;
mod error;
mod session;
mod user;

pub use claims::TokenClaims;
pub use error::AuthError;
pub use session::{SessionStore, USER_STORAGE_KEY};
pub use user::{
    AdminSignUpForm, CurrentUser, LoginRequest, LoginResponse, Role, SignUpForm, SignUpRequest,
    User, MIN_PASSWORD_LEN,
};
