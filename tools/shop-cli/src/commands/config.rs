//! Configuration commands.

use anyhow::{bail, Result};
use shop_sdk::config::default_config_toml;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("profile", &ctx.profile_dir().display().to_string());

    let config = &ctx.config;
    ctx.output.info("");
    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output.kv("timeout_secs", &config.api.timeout_secs.to_string());

    ctx.output.info("");
    ctx.output.info("[payment]");
    ctx.output.kv("checkout_url", &config.payment.checkout_url);
    if config.payment.client_key.is_some() {
        ctx.output.kv("client_key", "(set)");
    }
    ctx.output.kv("currency", config.payment.currency.code());
    ctx.output.kv("success_url", &config.payment.success_url);
    ctx.output.kv("fail_url", &config.payment.fail_url);

    ctx.output.info("");
    ctx.output.info("[checkout]");
    ctx.output.kv("order_route", config.checkout.order_route.path());

    ctx.output.info("");
    ctx.output.info("[bank_transfer]");
    ctx.output.kv("bank_name", &config.bank_transfer.bank_name);
    ctx.output.kv("account_number", &config.bank_transfer.account_number);
    ctx.output.kv("account_holder", &config.bank_transfer.account_holder);

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("shop.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, default_config_toml())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
