//! Shop CLI - a terminal storefront client.
//!
//! Commands:
//! - `shop products` - List the catalog
//! - `shop cart` - Show and edit the cart
//! - `shop login` / `shop signup` / `shop logout` / `shop whoami` - Account
//! - `shop checkout` - Place an order and start payment
//! - `shop redirect` - Finish a payment from the gateway's redirect URL
//! - `shop orders` - Order history
//! - `shop config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    CartArgs, CheckoutArgs, ConfigArgs, LoginArgs, OrdersArgs, ProductsArgs, RedirectArgs,
    SignupArgs,
};

/// Shop CLI - browse, fill a cart and check out from the terminal
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search products
    Products(ProductsArgs),

    /// Show or change the cart
    Cart(CartArgs),

    /// Sign in
    Login(LoginArgs),

    /// Create an account
    Signup(SignupArgs),

    /// Sign out and clear the cart
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Place an order for the cart
    Checkout(CheckoutArgs),

    /// Handle the payment gateway's success or fail redirect
    Redirect(RedirectArgs),

    /// List your orders
    Orders(OrdersArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "debug" } else { "warn" };
    shop_sdk::telemetry::init_tracing(directive).ok();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(2);
        }
    };
    tracing::debug!(api = %ctx.config.api.base_url, "config loaded");

    // Execute command
    let result = match cli.command {
        Commands::Products(args) => commands::products::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Login(args) => commands::account::login(args, &ctx).await,
        Commands::Signup(args) => commands::account::signup(args, &ctx).await,
        Commands::Logout => commands::account::logout(&ctx).await,
        Commands::Whoami => commands::account::whoami(&ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Redirect(args) => commands::checkout::redirect(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
