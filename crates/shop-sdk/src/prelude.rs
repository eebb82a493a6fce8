//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use shop_sdk::prelude::*;
//! ```
//!
//! Brings in the storefront container, configuration, the session store and
//! everything from `shop_commerce::prelude`.

pub use shop_commerce::prelude::*;

pub use shop_auth::{AdminSignUpForm, AuthError, CurrentUser, Role, SessionStore, SignUpForm, User};

pub use crate::config::StorefrontConfig;
pub use crate::storefront::{RedirectOutcome, Storefront, StorefrontBuilder};
pub use crate::widget::HostedCheckoutWidget;
pub use crate::{ConfigError, SdkError};
