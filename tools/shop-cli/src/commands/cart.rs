//! Cart commands.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use shop_sdk::prelude::*;

use super::{CartArgs, CartCommand};
use crate::context::Context;
use crate::output::truncate;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;
    let cart = shop.cart();

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {}
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let spinner = ctx.output.spinner("Looking up product...");
            let result = shop.products().get(&ProductId::new(product_id.as_str())).await;
            spinner.finish_and_clear();
            let product = result.with_context(|| format!("Product {} not found", product_id))?;

            if !product.is_purchasable() {
                ctx.output
                    .warn(&format!("{} is marked unavailable; adding anyway", product.name));
            }
            for _ in 0..quantity {
                cart.add_item(&product);
            }
            ctx.output
                .success(&format!("Added {} x {}", quantity, product.name));
        }
        CartCommand::Set {
            product_id,
            quantity,
        } => {
            let id = ProductId::new(product_id.as_str());
            if cart.items().iter().all(|l| l.product_id != id) {
                ctx.output
                    .warn(&format!("Product {} is not in the cart", product_id));
            }
            cart.update_quantity(&id, quantity);
            ctx.output.success("Cart updated");
        }
        CartCommand::Remove { product_id } => {
            cart.remove_item(&ProductId::new(product_id.as_str()));
            ctx.output.success("Removed from cart");
        }
        CartCommand::Clear { yes } => {
            if cart.is_empty() {
                ctx.output.info("Cart is already empty");
                return Ok(());
            }
            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove all {} items from the cart?", cart.total_count()))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.warn("Cart left as is");
                    return Ok(());
                }
            }
            cart.clear();
            ctx.output.success("Cart cleared");
        }
    }

    show(cart, ctx);
    Ok(())
}

fn show(cart: &CartStore, ctx: &Context) {
    let summary = cart.summary();
    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return;
    }

    ctx.output.header("Cart");
    if summary.lines.is_empty() {
        ctx.output.info("Your cart is empty");
        return;
    }

    ctx.output
        .table_row(&["ID", "NAME", "PRICE", "QTY", "SUBTOTAL"], &[6, 28, 12, 4, 12]);
    for line in &summary.lines {
        ctx.output.table_row(
            &[
                line.product_id.as_str(),
                &truncate(&line.name, 28),
                &line.unit_price.display(),
                &line.quantity.to_string(),
                &line.subtotal.display(),
            ],
            &[6, 28, 12, 4, 12],
        );
    }
    ctx.output.info("");
    ctx.output.kv("Items", &summary.total_count.to_string());
    ctx.output.kv("Total", &summary.total_amount.display());
}
