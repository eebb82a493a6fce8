//! Order history.

use anyhow::{bail, Result};
use shop_sdk::prelude::*;

use super::OrdersArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;
    if !shop.session().is_authenticated() {
        bail!("Not signed in. Run `shop login` first.");
    }
    if args.all && !shop.session().is_admin() {
        bail!("Listing every order requires an admin account.");
    }

    let spinner = ctx.output.spinner("Loading orders...");
    let result = if args.all {
        shop.orders().list_all().await
    } else {
        shop.order_history().await
    };
    spinner.finish_and_clear();
    let mut orders = result?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Orders");
    if orders.is_empty() {
        ctx.output.info("No orders yet");
        return Ok(());
    }

    let currency = shop.cart().snapshot().currency;
    ctx.output
        .table_row(&["ORDER", "DATE", "ITEMS", "TOTAL", "STATUS"], &[8, 10, 5, 12, 16]);
    for order in &orders {
        let date = order
            .created_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        ctx.output.table_row(
            &[
                order.id.as_str(),
                &date,
                &order.item_count().to_string(),
                &Money::new(order.total(), currency).display(),
                &status_badge(order.status.as_str(), order.status.display_name()),
            ],
            &[8, 10, 5, 12, 16],
        );
    }

    let open = orders.iter().filter(|o| !o.status.is_terminal()).count();
    ctx.output
        .info(&format!("{} orders, {} in progress", orders.len(), open));

    Ok(())
}
