//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod products;

use clap::{Args, Subcommand};
use shop_sdk::prelude::PaymentMethod;

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Search products by keyword.
    #[arg(short, long, conflicts_with_all = ["category", "available"])]
    pub search: Option<String>,

    /// Only products in this category.
    #[arg(long, conflicts_with = "available")]
    pub category: Option<String>,

    /// Only products currently on sale.
    #[arg(short, long)]
    pub available: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    /// List every customer's orders (admin only).
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    Show,
    /// Add a product from the catalog.
    Add {
        /// Product ID.
        product_id: String,
        /// Units to add.
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Set a line's quantity (0 or less removes it).
    Set {
        /// Product ID.
        product_id: String,
        /// New quantity.
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        product_id: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Account email (prompted if omitted).
    #[arg(short, long)]
    pub email: Option<String>,

    /// Password (prompted if omitted).
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for the signup command.
#[derive(Args)]
pub struct SignupArgs {
    /// Account email.
    #[arg(short, long)]
    pub email: String,

    /// Display name.
    #[arg(short, long)]
    pub name: String,

    /// Phone number.
    #[arg(short, long)]
    pub phone: Option<String>,

    /// Register an administrator using this admin code.
    #[arg(long)]
    pub admin_code: Option<String>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient name.
    #[arg(long)]
    pub recipient: String,

    /// Recipient phone.
    #[arg(long)]
    pub phone: String,

    /// Street address.
    #[arg(long)]
    pub address: String,

    /// Postal code.
    #[arg(long)]
    pub zip: Option<String>,

    /// Apartment, floor, etc.
    #[arg(long)]
    pub detail: Option<String>,

    /// Payment method: card or bank-transfer.
    #[arg(short, long, default_value = "card")]
    pub method: PaymentMethod,
}

/// Arguments for the redirect command.
#[derive(Args)]
pub struct RedirectArgs {
    /// The URL the gateway redirected to (success or fail).
    pub url: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
