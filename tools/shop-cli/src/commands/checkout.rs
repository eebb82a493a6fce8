//! Checkout and payment redirect handling.

use anyhow::{bail, Result};
use serde_json::json;
use shop_sdk::prelude::*;

use super::{CheckoutArgs, RedirectArgs};
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let (shop, widget) = ctx.open().await?;
    if !shop.session().is_authenticated() {
        bail!("Not signed in. Run `shop login` first.");
    }

    let mut address = ShippingAddress::new(args.recipient, args.phone, args.address);
    if let Some(zip) = args.zip {
        address = address.with_zip_code(zip);
    }
    if let Some(detail) = args.detail {
        address = address.with_detail(detail);
    }

    let summary = shop.cart().summary();
    ctx.output.header("Checkout");
    ctx.output.kv("Items", &summary.total_count.to_string());
    ctx.output.kv("Total", &summary.total_amount.display());
    ctx.output.kv("Ship to", &address.one_line());
    ctx.output.kv("Payment", args.method.display_name());

    let spinner = ctx.output.spinner("Placing order...");
    let result = shop.checkout(address, args.method).await;
    spinner.finish_and_clear();
    let outcome = result?;

    match outcome {
        CheckoutOutcome::AwaitingGateway { order_id, amount } => {
            let url = widget.last_launch();
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "orderId": order_id,
                    "amount": amount.amount,
                    "checkoutUrl": url.as_ref().map(|u| u.as_str()),
                }));
                return Ok(());
            }
            ctx.output
                .success(&format!("Order {} created for {}", order_id, amount.display()));
            if let Some(url) = url {
                ctx.output.info("Complete the payment at:");
                println!("\n  {}\n", url);
            }
            ctx.output
                .info("Then run `shop redirect <URL>` with the address the gateway sends you to.");
        }
        CheckoutOutcome::BankTransferPending {
            order_id,
            amount,
            instructions,
        } => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "orderId": order_id,
                    "amount": amount.amount,
                    "bankTransfer": instructions,
                }));
                return Ok(());
            }
            ctx.output
                .success(&format!("Order {} placed; awaiting bank transfer", order_id));
            ctx.output.kv("Amount", &amount.display());
            ctx.output.kv("Bank", &instructions.bank_name);
            ctx.output.kv("Account", &instructions.account_number);
            ctx.output.kv("Holder", &instructions.account_holder);
            ctx.output.kv(
                "Deadline",
                &format!("within {} hours", instructions.deadline_hours),
            );
        }
    }
    Ok(())
}

/// Run the redirect command.
pub async fn redirect(args: RedirectArgs, ctx: &Context) -> Result<()> {
    let (shop, _) = ctx.open().await?;

    let spinner = ctx.output.spinner("Confirming payment...");
    let result = shop.handle_redirect(&args.url).await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(CommerceError::MalformedCallback(reason)) => {
            bail!("{}. Return to checkout and try again; your cart is unchanged.", reason)
        }
        Err(e) => return Err(e.into()),
    };

    match outcome {
        RedirectOutcome::Confirmed(ConfirmationOutcome::Confirmed {
            order_id,
            amount,
            payment,
        }) => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "status": "confirmed",
                    "orderId": order_id,
                    "amount": amount,
                    "payment": payment,
                }));
                return Ok(());
            }
            let currency = shop.cart().snapshot().currency;
            ctx.output
                .success(&format!("Payment confirmed for order {}", order_id));
            ctx.output
                .kv("Amount", &Money::new(amount, currency).display());
            if let Some(method) = &payment.method {
                ctx.output.kv("Method", method);
            }
        }
        RedirectOutcome::Confirmed(ConfirmationOutcome::AlreadyProcessed { order_id }) => {
            if ctx.output.is_json() {
                ctx.output
                    .json(&json!({ "status": "already_processed", "orderId": order_id }));
                return Ok(());
            }
            ctx.output
                .success(&format!("Order {} was already paid", order_id));
        }
        RedirectOutcome::Failed(failure) => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "status": "failed",
                    "code": failure.code.as_ref().map(|c| c.as_str()),
                    "message": failure.message,
                    "detail": failure.detail,
                    "orderId": failure.order_id,
                }));
                return Ok(());
            }
            let cancelled = failure
                .code
                .as_ref()
                .is_some_and(GatewayErrorCode::is_cancellation);
            if cancelled {
                ctx.output.warn(failure.message);
            } else {
                ctx.output.error(failure.message);
            }
            if let Some(detail) = &failure.detail {
                ctx.output.kv("Gateway", detail);
            }
            ctx.output.info("Your cart is unchanged; run `shop checkout` to try again.");
        }
    }
    Ok(())
}
