//! Catalog listing.

use anyhow::Result;

use super::ProductsArgs;
use crate::context::Context;
use crate::output::truncate;

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;
    let products_api = shop.products();

    let spinner = ctx.output.spinner("Loading products...");
    let (title, result) = if let Some(keyword) = &args.search {
        (
            format!("Products matching \"{}\"", keyword.trim()),
            products_api.search(keyword).await,
        )
    } else if let Some(category) = &args.category {
        (
            format!("Products in {}", category),
            products_api.by_category(category).await,
        )
    } else if args.available {
        ("Products on sale".to_string(), products_api.available().await)
    } else {
        ("Products".to_string(), products_api.list().await)
    };
    spinner.finish_and_clear();
    let products = result?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&title);
    if products.is_empty() {
        ctx.output.info("No products found");
        return Ok(());
    }

    let currency = shop.cart().snapshot().currency;
    ctx.output.table_row(&["ID", "NAME", "PRICE", "STOCK"], &[6, 32, 12, 6]);
    for product in &products {
        let stock = product
            .stock
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let name = if product.is_purchasable() {
            truncate(&product.name, 32)
        } else {
            format!("{} (unavailable)", truncate(&product.name, 18))
        };
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &name,
                &product.unit_price(currency).display(),
                &stock,
            ],
            &[6, 32, 12, 6],
        );
    }

    Ok(())
}
